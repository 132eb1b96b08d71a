//! 应用上下文

use chrono::{DateTime, Utc};
use config_abstractions::AppSettings;
use di_abstractions::{ComponentResolverExt, ContainerStats, DiContainer};
use di_impl::Container;
use std::future::Future;
use std::sync::Arc;
use tracing::{info, warn};
use wirebox_common::{ApplicationError, ComponentId};

/// 应用上下文
///
/// 持有已构建的容器和生效的设置
#[derive(Debug, Clone)]
pub struct ApplicationContext {
    container: Arc<Container>,
    settings: AppSettings,
    created_at: DateTime<Utc>,
}

impl ApplicationContext {
    /// 创建应用上下文
    pub fn new(container: Arc<Container>, settings: AppSettings) -> Self {
        Self {
            container,
            settings,
            created_at: Utc::now(),
        }
    }

    /// 按能力或具体类型解析组件
    pub fn resolve<I: ?Sized + Send + Sync + 'static>(&self) -> Result<Arc<I>, ApplicationError> {
        Ok(self.container.resolve::<I>()?)
    }

    /// 按标识解析组件
    pub fn resolve_named<I: ?Sized + Send + Sync + 'static>(
        &self,
        id: impl Into<ComponentId>,
    ) -> Result<Arc<I>, ApplicationError> {
        Ok(self.container.resolve_named::<I>(id)?)
    }

    /// 解析满足能力的所有组件
    pub fn resolve_all<I: ?Sized + Send + Sync + 'static>(&self) -> Result<Vec<Arc<I>>, ApplicationError> {
        Ok(self.container.resolve_all::<I>()?)
    }

    /// 依赖注入容器
    pub fn container(&self) -> &Arc<Container> {
        &self.container
    }

    /// 生效的设置
    pub fn settings(&self) -> &AppSettings {
        &self.settings
    }

    /// 上下文创建时间
    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    /// 容器统计信息
    pub fn stats(&self) -> ContainerStats {
        self.container.stats()
    }

    /// 执行一次应用逻辑，结束后无论成功与否都关闭上下文
    pub async fn run<F, Fut, R>(self, f: F) -> Result<R, ApplicationError>
    where
        F: FnOnce(ApplicationContext) -> Fut,
        Fut: Future<Output = Result<R, ApplicationError>>,
    {
        let result = f(self.clone()).await;
        if let Err(error) = &result {
            warn!("应用运行失败: {}", error);
        }
        self.close().await?;
        result
    }

    /// 关闭上下文，释放所有单例
    pub async fn close(&self) -> Result<(), ApplicationError> {
        let stats = self.container.stats();
        info!(
            "关闭应用上下文: 已解析 {} 个单例, {} 个解析错误",
            stats.resolved_singletons, stats.resolution_errors
        );
        self.container.close();
        Ok(())
    }
}

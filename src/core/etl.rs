use crate::domain::ports::{Pipeline, Summary};
use crate::utils::error::Result;
use crate::utils::monitor::SystemMonitor;

pub struct EtlEngine<P: Pipeline> {
    pipeline: P,
    monitor: SystemMonitor,
}

impl<P: Pipeline> EtlEngine<P> {
    pub fn new(pipeline: P) -> Self {
        Self::new_with_monitoring(pipeline, false)
    }

    pub fn new_with_monitoring(pipeline: P, monitor_enabled: bool) -> Self {
        Self {
            pipeline,
            monitor: SystemMonitor::new(monitor_enabled),
        }
    }

    pub async fn run(&self) -> Result<String> {
        let name = self.pipeline.name();
        tracing::info!("Starting pipeline {}", name);
        self.monitor.log_stats("Start");

        // Extract
        tracing::info!("Extracting data...");
        let raw_data = self.pipeline.extract().await?;
        tracing::info!("Extracted: {}", raw_data.summary());
        self.monitor.log_stats("Extract");

        // Transform
        tracing::info!("Transforming data...");
        let transformed = self.pipeline.transform(raw_data).await?;
        tracing::info!("Transformed: {}", transformed.summary());
        self.monitor.log_stats("Transform");

        // Load
        tracing::info!("Loading data...");
        let output_path = self.pipeline.load(transformed).await?;
        tracing::info!("Output saved to: {}", output_path);
        self.monitor.log_stats("Load");
        self.monitor.log_final_stats();

        Ok(output_path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::utils::error::EtlError;
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct Count(usize);

    impl Summary for Count {
        fn summary(&self) -> String {
            format!("{} item(s)", self.0)
        }
    }

    struct CountingPipeline {
        loads: AtomicUsize,
        fail_extract: bool,
    }

    #[async_trait]
    impl Pipeline for CountingPipeline {
        type Extracted = Count;
        type Transformed = Count;

        fn name(&self) -> &str {
            "counting"
        }

        async fn extract(&self) -> Result<Count> {
            if self.fail_extract {
                return Err(EtlError::ProcessingError {
                    message: "extract failed".to_string(),
                });
            }
            Ok(Count(3))
        }

        async fn transform(&self, data: Count) -> Result<Count> {
            Ok(Count(data.0 * 2))
        }

        async fn load(&self, result: Count) -> Result<String> {
            self.loads.fetch_add(1, Ordering::SeqCst);
            Ok(format!("out/{}.json", result.0))
        }
    }

    #[tokio::test]
    async fn test_run_chains_phases() {
        let engine = EtlEngine::new(CountingPipeline {
            loads: AtomicUsize::new(0),
            fail_extract: false,
        });

        assert_eq!(engine.run().await.unwrap(), "out/6.json");
        assert_eq!(engine.pipeline.loads.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_extract_failure_stops_the_run() {
        let engine = EtlEngine::new_with_monitoring(
            CountingPipeline {
                loads: AtomicUsize::new(0),
                fail_extract: true,
            },
            true,
        );

        assert!(engine.run().await.is_err());
        assert_eq!(engine.pipeline.loads.load(Ordering::SeqCst), 0);
    }
}

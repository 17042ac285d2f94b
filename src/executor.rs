//! Runs a composed request against the generation service, retrying
//! transient server failures with exponential backoff and classifying the
//! final failure for display.

use std::sync::Arc;
use std::time::Duration;

use futures::future::BoxFuture;

use crate::config::RetryPolicy;
use crate::error::Result;
use crate::gemini::GenerationService;
use crate::models::{GenerationOutcome, ImageGenerationRequest};

/// Injectable backoff wait so tests can observe the schedule without
/// wall-clock time passing.
pub type DelayFn = Arc<dyn Fn(Duration) -> BoxFuture<'static, ()> + Send + Sync>;

/// One attempt sequence moves through these states. Terminal states are
/// `Finished(Ok)` and `Finished(Err)`; `RetryWait` is entered only for a
/// transient failure with attempts remaining.
enum AttemptState {
    Idle,
    Attempting(u32),
    RetryWait(u32),
    Finished(Result<String>),
}

pub struct GenerationExecutor {
    service: Arc<dyn GenerationService>,
    policy: RetryPolicy,
    delay: DelayFn,
}

impl GenerationExecutor {
    pub fn new(service: Arc<dyn GenerationService>) -> Self {
        Self {
            service,
            policy: RetryPolicy::default(),
            delay: Arc::new(|duration| Box::pin(tokio::time::sleep(duration))),
        }
    }

    pub fn with_policy(mut self, policy: RetryPolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn with_delay(mut self, delay: DelayFn) -> Self {
        self.delay = delay;
        self
    }

    /// Run one whole attempt sequence to completion. The caller suspends
    /// until success, a terminal failure, or attempt exhaustion; there is no
    /// cancellation primitive, a stale result is simply discarded.
    pub async fn run(&self, request: ImageGenerationRequest) -> GenerationOutcome {
        let mut state = AttemptState::Idle;

        loop {
            state = match state {
                AttemptState::Idle => AttemptState::Attempting(1),

                AttemptState::Attempting(attempt) => {
                    log::info!(
                        "Generation attempt {}/{} with model {}",
                        attempt,
                        self.policy.max_attempts,
                        request.model.as_str()
                    );
                    match self.service.generate(&request).await {
                        Ok(response) => AttemptState::Finished(Ok(format!(
                            "data:image/png;base64,{}",
                            response.image_data
                        ))),
                        Err(err) => {
                            log::warn!("Attempt {} failed: {}", attempt, err);
                            if err.is_transient() && attempt < self.policy.max_attempts {
                                AttemptState::RetryWait(attempt)
                            } else {
                                AttemptState::Finished(Err(err))
                            }
                        }
                    }
                }

                AttemptState::RetryWait(attempt) => {
                    let delay = self.policy.delay_after(attempt);
                    log::debug!("Waiting {}ms before retry", delay.as_millis());
                    (self.delay)(delay).await;
                    AttemptState::Attempting(attempt + 1)
                }

                AttemptState::Finished(Ok(image)) => {
                    log::info!("Image generated ({} chars)", image.len());
                    return GenerationOutcome::Success { image };
                }

                AttemptState::Finished(Err(err)) => {
                    log::error!("Generation failed: {}", err);
                    return GenerationOutcome::Failure {
                        class: err.classify(),
                        message: err.user_message(),
                    };
                }
            };
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::VecDeque;
    use std::sync::atomic::{AtomicU32, Ordering};
    use std::sync::Mutex;

    use async_trait::async_trait;

    use crate::error::{ErrorClass, GeminiError};
    use crate::models::{
        AspectRatio, ImageGenerationResponse, ModelVersion, OutputConfig,
    };

    enum Step {
        Image(&'static str),
        Status(u16, &'static str),
        NoImage,
    }

    struct ScriptedService {
        script: Mutex<VecDeque<Step>>,
        calls: AtomicU32,
    }

    impl ScriptedService {
        fn new(steps: Vec<Step>) -> Arc<Self> {
            Arc::new(Self {
                script: Mutex::new(steps.into()),
                calls: AtomicU32::new(0),
            })
        }

        fn calls(&self) -> u32 {
            self.calls.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl GenerationService for ScriptedService {
        async fn generate(
            &self,
            request: &ImageGenerationRequest,
        ) -> Result<ImageGenerationResponse> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            let step = self
                .script
                .lock()
                .unwrap()
                .pop_front()
                .expect("service called more times than scripted");
            match step {
                Step::Image(data) => Ok(ImageGenerationResponse {
                    image_data: data.to_string(),
                    mime_type: "image/png".into(),
                    model: request.model.as_str().to_string(),
                }),
                Step::Status(status, message) => Err(GeminiError::ServiceError {
                    status,
                    message: message.to_string(),
                }),
                Step::NoImage => Err(GeminiError::NoImage(
                    "No image generated in the response.".into(),
                )),
            }
        }
    }

    fn recording_delay(record: Arc<Mutex<Vec<Duration>>>) -> DelayFn {
        Arc::new(move |duration| {
            record.lock().unwrap().push(duration);
            Box::pin(futures::future::ready(()))
        })
    }

    fn request() -> ImageGenerationRequest {
        ImageGenerationRequest {
            prompt: "a lighthouse".into(),
            model: ModelVersion::Gemini3ProImage,
            attachments: Vec::new(),
            output: OutputConfig {
                aspect_ratio: AspectRatio::Square,
                resolution: None,
            },
        }
    }

    fn executor(service: Arc<ScriptedService>, delays: Arc<Mutex<Vec<Duration>>>) -> GenerationExecutor {
        GenerationExecutor::new(service).with_delay(recording_delay(delays))
    }

    #[tokio::test]
    async fn retries_transient_failures_then_succeeds() {
        let service = ScriptedService::new(vec![
            Step::Status(503, "Service Unavailable"),
            Step::Status(503, "Service Unavailable"),
            Step::Image("QUJD"),
        ]);
        let delays = Arc::new(Mutex::new(Vec::new()));
        let outcome = executor(service.clone(), delays.clone()).run(request()).await;

        assert_eq!(
            outcome,
            GenerationOutcome::Success {
                image: "data:image/png;base64,QUJD".into()
            }
        );
        assert_eq!(service.calls(), 3);
        assert_eq!(
            *delays.lock().unwrap(),
            vec![Duration::from_millis(1000), Duration::from_millis(2000)]
        );
    }

    #[tokio::test]
    async fn quota_failures_are_terminal_after_one_call() {
        let service = ScriptedService::new(vec![Step::Status(429, "Quota exceeded")]);
        let delays = Arc::new(Mutex::new(Vec::new()));
        let outcome = executor(service.clone(), delays.clone()).run(request()).await;

        assert_eq!(service.calls(), 1);
        assert!(delays.lock().unwrap().is_empty());
        match outcome {
            GenerationOutcome::Failure { class, message } => {
                assert_eq!(class, ErrorClass::QuotaExceeded);
                assert!(message.contains("paid API key"));
            }
            other => panic!("expected failure, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn exhausts_the_attempt_ceiling_on_persistent_server_errors() {
        let service = ScriptedService::new(vec![
            Step::Status(500, "boom"),
            Step::Status(500, "boom"),
            Step::Status(500, "boom"),
        ]);
        let delays = Arc::new(Mutex::new(Vec::new()));
        let outcome = executor(service.clone(), delays.clone()).run(request()).await;

        assert_eq!(service.calls(), 3);
        assert_eq!(
            *delays.lock().unwrap(),
            vec![Duration::from_millis(1000), Duration::from_millis(2000)]
        );
        match outcome {
            GenerationOutcome::Failure { class, message } => {
                assert_eq!(class, ErrorClass::TransientServerError);
                assert!(message.contains("try again"));
            }
            other => panic!("expected failure, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn missing_image_payload_is_not_retried() {
        let service = ScriptedService::new(vec![Step::NoImage]);
        let delays = Arc::new(Mutex::new(Vec::new()));
        let outcome = executor(service.clone(), delays.clone()).run(request()).await;

        assert_eq!(service.calls(), 1);
        assert!(delays.lock().unwrap().is_empty());
        match outcome {
            GenerationOutcome::Failure { class, .. } => {
                assert_eq!(class, ErrorClass::NoImageReturned)
            }
            other => panic!("expected failure, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn honors_a_custom_attempt_ceiling() {
        let service = ScriptedService::new(vec![
            Step::Status(503, "down"),
            Step::Status(503, "down"),
        ]);
        let delays = Arc::new(Mutex::new(Vec::new()));
        let outcome = GenerationExecutor::new(service.clone())
            .with_policy(RetryPolicy::new().with_max_attempts(2))
            .with_delay(recording_delay(delays.clone()))
            .run(request())
            .await;

        assert_eq!(service.calls(), 2);
        assert_eq!(*delays.lock().unwrap(), vec![Duration::from_millis(1000)]);
        assert!(matches!(outcome, GenerationOutcome::Failure { .. }));
    }
}

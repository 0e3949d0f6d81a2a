//! Detection model adapter.
//!
//! Bridges the detector to the host's annotation format: resolves each task's
//! image, runs detection, and converts pixel boxes into percentage-coordinate
//! rectangle labels.

use std::sync::Arc;

use image::GenericImageView;
use serde_json::Value;
use tokio::task;
use tracing::{debug, info, warn};

use async_trait::async_trait;
use autolabel_detect::Detector;
use autolabel_models::{AnnotationResult, Prediction, RectangleValue, Task, WebhookEvent};

use crate::cache::KvCache;
use crate::config::BackendConfig;
use crate::error::{BackendError, BackendResult};
use crate::model::MlModel;
use crate::resolver::ResourceResolver;
use crate::viz::VisualSink;

/// Cache key holding the active model version tag.
pub const MODEL_VERSION_KEY: &str = "model_version";
/// Cache key holding the training-data marker written by the update hook.
pub const TRAIN_DATA_KEY: &str = "train_data";
/// Cache key holding the project's label schema from setup.
pub const LABEL_SCHEMA_KEY: &str = "label_schema";

// Placeholder values the update hook writes; no real training happens yet.
const TRAIN_DATA_PLACEHOLDER: &str = "annotations-received";
const MODEL_VERSION_PLACEHOLDER: &str = "0.0.1+feedback";

/// ML backend that serves rectangle labels from an object detector.
pub struct DetectionModel {
    detector: Arc<dyn Detector>,
    cache: Arc<dyn KvCache>,
    resolver: Arc<dyn ResourceResolver>,
    viz: Option<Arc<dyn VisualSink>>,
    config: BackendConfig,
}

impl DetectionModel {
    /// Create the adapter from its injected collaborators.
    pub fn new(
        detector: Arc<dyn Detector>,
        cache: Arc<dyn KvCache>,
        resolver: Arc<dyn ResourceResolver>,
        viz: Option<Arc<dyn VisualSink>>,
        config: BackendConfig,
    ) -> Self {
        Self {
            detector,
            cache,
            resolver,
            viz,
            config,
        }
    }

    /// The stored version tag, falling back to the configured default.
    fn current_version(&self) -> BackendResult<String> {
        Ok(self
            .cache
            .get(MODEL_VERSION_KEY)?
            .unwrap_or_else(|| self.config.default_model_version.clone()))
    }

    /// Resolve, decode, and detect for one task.
    async fn predict_task(&self, task: &Task) -> BackendResult<Prediction> {
        let reference = task
            .data
            .image
            .as_deref()
            .ok_or(BackendError::MissingImage(task.id))?;

        let path = self.resolver.resolve(reference, task.id).await?;

        // Decode and inference are CPU-bound; keep them off the async runtime.
        let detector = Arc::clone(&self.detector);
        let viz = self.viz.clone();
        let task_id = task.id;
        let (detections, width, height) = task::spawn_blocking(move || -> BackendResult<_> {
            let image = image::open(&path)?;
            let (width, height) = image.dimensions();
            let detections = detector.detect(&image)?;

            if let Some(sink) = viz {
                if let Err(e) = sink.publish(task_id, &image.to_rgb8(), &detections) {
                    warn!(task_id, error = %e, "Visualization sink failed");
                }
            }

            Ok((detections, width, height))
        })
        .await
        .map_err(|e| BackendError::internal(format!("Detection task panicked: {}", e)))??;

        let labels = self.detector.labels();
        let results: Vec<AnnotationResult> = detections
            .iter()
            .map(|det| {
                let label = labels
                    .get(det.class_id)
                    .map(String::as_str)
                    .unwrap_or("unknown");
                let value = RectangleValue::from_pixel_box(
                    (det.xmin, det.ymin, det.xmax, det.ymax),
                    width,
                    height,
                    label,
                );
                AnnotationResult::rectangle(value, det.confidence)
            })
            .collect();

        info!(task_id = task.id, detections = results.len(), "Task predicted");
        Ok(Prediction::new(results, self.current_version()?))
    }
}

#[async_trait]
impl MlModel for DetectionModel {
    async fn setup(
        &self,
        project: Option<&str>,
        label_schema: Option<&str>,
    ) -> BackendResult<String> {
        if let Some(schema) = label_schema {
            self.cache.set(LABEL_SCHEMA_KEY, schema)?;
        }

        let version = match self.cache.get(MODEL_VERSION_KEY)? {
            Some(v) => v,
            None => {
                self.cache
                    .set(MODEL_VERSION_KEY, &self.config.default_model_version)?;
                self.config.default_model_version.clone()
            }
        };

        info!(
            project = project.unwrap_or("-"),
            model_version = %version,
            detector = self.detector.name(),
            "Model setup complete"
        );
        Ok(version)
    }

    async fn predict(
        &self,
        tasks: &[Task],
        context: Option<&Value>,
    ) -> BackendResult<Vec<Prediction>> {
        if let Some(context) = context {
            debug!(context = %context, "Prediction context");
        }

        let mut predictions = Vec::with_capacity(tasks.len());
        for task in tasks {
            predictions.push(self.predict_task(task).await?);
        }
        Ok(predictions)
    }

    async fn fit(&self, event: &WebhookEvent, payload: &Value) -> BackendResult<()> {
        let old_data = self.cache.get(TRAIN_DATA_KEY)?;
        let old_version = self.cache.get(MODEL_VERSION_KEY)?;
        info!(
            event = %event,
            old_data = ?old_data,
            old_model_version = ?old_version,
            "Update hook invoked"
        );
        debug!(payload = %payload, "Event payload");

        // No retraining here: the host forbids long-running work in this hook,
        // so a real update would be queued to an out-of-band worker. Record
        // that feedback arrived and bump the placeholder tag.
        self.cache.set(TRAIN_DATA_KEY, TRAIN_DATA_PLACEHOLDER)?;
        self.cache
            .set(MODEL_VERSION_KEY, MODEL_VERSION_PLACEHOLDER)?;

        info!("Update hook completed");
        Ok(())
    }

    async fn model_version(&self) -> BackendResult<Option<String>> {
        self.cache.get(MODEL_VERSION_KEY)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;
    use std::path::PathBuf;

    use autolabel_detect::{Detection, StubDetector};

    use crate::cache::MemoryCache;
    use crate::resolver::{HostResolver, ResolverConfig};

    fn cat_detection() -> Detection {
        Detection {
            xmin: 100.0,
            ymin: 100.0,
            xmax: 300.0,
            ymax: 200.0,
            class_id: 0,
            confidence: 0.8,
        }
    }

    /// Write a blank 1000x500 PNG and return its path.
    fn test_image(dir: &tempfile::TempDir) -> PathBuf {
        let path = dir.path().join("img.png");
        image::DynamicImage::new_rgb8(1000, 500).save(&path).unwrap();
        path
    }

    fn model_with(detector: StubDetector) -> (DetectionModel, Arc<MemoryCache>) {
        let cache = Arc::new(MemoryCache::new());
        let model = DetectionModel::new(
            Arc::new(detector),
            Arc::clone(&cache) as Arc<dyn KvCache>,
            Arc::new(HostResolver::new(ResolverConfig::default()).unwrap()),
            None,
            BackendConfig::default(),
        );
        (model, cache)
    }

    #[tokio::test]
    async fn test_predict_converts_to_percentages() {
        let dir = tempfile::tempdir().unwrap();
        let image_path = test_image(&dir);

        let (model, _) = model_with(StubDetector::new(
            vec![cat_detection()],
            vec!["cat".to_string()],
        ));

        let tasks = vec![Task::new(1, image_path.to_str().unwrap())];
        let predictions = model.predict(&tasks, None).await.unwrap();

        assert_eq!(predictions.len(), 1);
        let prediction = &predictions[0];
        assert!((prediction.score - 0.8).abs() < 1e-6);
        assert_eq!(prediction.model_version, "0.0.1");

        assert_eq!(prediction.result.len(), 1);
        let value = &prediction.result[0].value;
        assert!((value.x - 10.0).abs() < 1e-9);
        assert!((value.y - 20.0).abs() < 1e-9);
        assert!((value.width - 20.0).abs() < 1e-9);
        assert!((value.height - 20.0).abs() < 1e-9);
        assert_eq!(value.rotation, 0.0);
        assert_eq!(value.rectanglelabels, vec!["cat".to_string()]);
    }

    #[tokio::test]
    async fn test_predict_empty_detections_scores_zero() {
        let dir = tempfile::tempdir().unwrap();
        let image_path = test_image(&dir);

        let (model, _) = model_with(StubDetector::empty());
        let tasks = vec![Task::new(1, image_path.to_str().unwrap())];
        let predictions = model.predict(&tasks, None).await.unwrap();

        assert_eq!(predictions.len(), 1);
        assert!(predictions[0].result.is_empty());
        assert_eq!(predictions[0].score, 0.0);
    }

    #[tokio::test]
    async fn test_predict_missing_image_fails_batch() {
        let dir = tempfile::tempdir().unwrap();
        let image_path = test_image(&dir);

        let (model, _) = model_with(StubDetector::empty());
        let tasks = vec![
            Task::new(1, image_path.to_str().unwrap()),
            Task {
                id: 2,
                data: Default::default(),
            },
        ];

        let err = model.predict(&tasks, None).await;
        assert!(matches!(err, Err(BackendError::MissingImage(2))));
    }

    #[tokio::test]
    async fn test_predict_ids_unique_across_calls() {
        let dir = tempfile::tempdir().unwrap();
        let image_path = test_image(&dir);

        let (model, _) = model_with(StubDetector::new(
            vec![cat_detection(), cat_detection()],
            vec!["cat".to_string()],
        ));
        let tasks = vec![Task::new(1, image_path.to_str().unwrap())];

        let first = model.predict(&tasks, None).await.unwrap();
        let second = model.predict(&tasks, None).await.unwrap();

        let ids: HashSet<String> = first
            .iter()
            .chain(second.iter())
            .flat_map(|p| p.result.iter().map(|r| r.id.clone()))
            .collect();
        assert_eq!(ids.len(), 4);
    }

    #[tokio::test]
    async fn test_predict_unknown_class_falls_back() {
        let dir = tempfile::tempdir().unwrap();
        let image_path = test_image(&dir);

        let mut detection = cat_detection();
        detection.class_id = 99;
        let (model, _) = model_with(StubDetector::new(vec![detection], vec!["cat".to_string()]));

        let tasks = vec![Task::new(1, image_path.to_str().unwrap())];
        let predictions = model.predict(&tasks, None).await.unwrap();
        assert_eq!(
            predictions[0].result[0].value.rectanglelabels,
            vec!["unknown".to_string()]
        );
    }

    #[tokio::test]
    async fn test_setup_initializes_version_and_schema() {
        let (model, cache) = model_with(StubDetector::empty());

        let version = model
            .setup(Some("7"), Some("<View><RectangleLabels/></View>"))
            .await
            .unwrap();
        assert_eq!(version, "0.0.1");
        assert_eq!(
            cache.get(MODEL_VERSION_KEY).unwrap(),
            Some("0.0.1".to_string())
        );
        assert_eq!(
            cache.get(LABEL_SCHEMA_KEY).unwrap(),
            Some("<View><RectangleLabels/></View>".to_string())
        );

        // Second setup keeps the stored version.
        let again = model.setup(None, None).await.unwrap();
        assert_eq!(again, "0.0.1");
    }

    #[tokio::test]
    async fn test_fit_overwrites_cache_entries() {
        let (model, cache) = model_with(StubDetector::empty());
        model.setup(None, None).await.unwrap();

        model
            .fit(&WebhookEvent::AnnotationCreated, &serde_json::json!({}))
            .await
            .unwrap();

        assert_eq!(
            cache.get(TRAIN_DATA_KEY).unwrap(),
            Some(TRAIN_DATA_PLACEHOLDER.to_string())
        );
        assert_eq!(
            cache.get(MODEL_VERSION_KEY).unwrap(),
            Some(MODEL_VERSION_PLACEHOLDER.to_string())
        );
        assert_eq!(
            model.model_version().await.unwrap(),
            Some(MODEL_VERSION_PLACEHOLDER.to_string())
        );
    }
}

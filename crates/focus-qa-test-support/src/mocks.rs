//! Mock implementations of core port traits.

use std::sync::{Arc, Mutex, PoisonError};

use focus_qa_core::domain::{ImageInfo, PerImageResult};
use focus_qa_core::ports::{
    ImageLoadError, ImageSource, ProgressEvent, ProgressSink, ResultOutput,
};

/// Mock implementation of `ImageSource` for testing.
///
/// Yields pre-built images, optionally interleaved with load failures, and
/// tracks iteration for assertions.
pub struct MockImageSource {
    items: Vec<Result<ImageInfo, String>>,
    iteration_count: Arc<Mutex<usize>>,
}

impl MockImageSource {
    /// Creates a new mock source with the given images.
    #[must_use]
    pub fn new(images: Vec<ImageInfo>) -> Self {
        Self {
            items: images.into_iter().map(Ok).collect(),
            iteration_count: Arc::new(Mutex::new(0)),
        }
    }

    /// Appends an item that fails to load with the given path.
    #[must_use]
    pub fn with_failure(mut self, path: impl Into<String>) -> Self {
        self.items.push(Err(path.into()));
        self
    }

    /// Creates an empty mock source.
    #[must_use]
    pub fn empty() -> Self {
        Self::new(vec![])
    }

    /// Returns the number of times the source has been iterated.
    #[must_use]
    pub fn iteration_count(&self) -> usize {
        *self
            .iteration_count
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }
}

impl ImageSource for MockImageSource {
    fn images(&self) -> Box<dyn Iterator<Item = anyhow::Result<ImageInfo>> + Send + '_> {
        let count = Arc::clone(&self.iteration_count);
        if let Ok(mut c) = count.lock() {
            *c += 1;
        }
        Box::new(self.items.iter().map(|item| match item {
            Ok(info) => Ok(info.clone()),
            Err(path) => Err(ImageLoadError::new(path.clone(), "mock decode failure").into()),
        }))
    }

    fn count_hint(&self) -> Option<usize> {
        Some(self.items.len())
    }
}

/// Mock implementation of `ResultOutput` for testing.
///
/// Captures results for later assertions.
pub struct MockResultOutput {
    results: Arc<Mutex<Vec<PerImageResult>>>,
    flush_count: Arc<Mutex<usize>>,
}

impl MockResultOutput {
    /// Creates a new mock output.
    #[must_use]
    pub fn new() -> Self {
        Self {
            results: Arc::new(Mutex::new(Vec::new())),
            flush_count: Arc::new(Mutex::new(0)),
        }
    }

    /// Returns all captured results.
    #[must_use]
    pub fn results(&self) -> Vec<PerImageResult> {
        self.results
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Returns the number of times `flush()` was called.
    #[must_use]
    pub fn flush_count(&self) -> usize {
        *self
            .flush_count
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }
}

impl Default for MockResultOutput {
    fn default() -> Self {
        Self::new()
    }
}

impl ResultOutput for MockResultOutput {
    fn write(&self, result: &PerImageResult) -> anyhow::Result<()> {
        self.results
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(result.clone());
        Ok(())
    }

    fn flush(&self) -> anyhow::Result<()> {
        if let Ok(mut c) = self.flush_count.lock() {
            *c += 1;
        }
        Ok(())
    }
}

/// Mock implementation of `ProgressSink` for testing.
///
/// Captures events for later assertions.
pub struct MockProgressSink {
    events: Arc<Mutex<Vec<ProgressEvent>>>,
}

impl MockProgressSink {
    /// Creates a new mock progress sink.
    #[must_use]
    pub fn new() -> Self {
        Self {
            events: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Returns all captured events.
    #[must_use]
    pub fn events(&self) -> Vec<ProgressEvent> {
        self.events
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Returns the number of `Started` events.
    #[must_use]
    pub fn started_count(&self) -> usize {
        self.events()
            .iter()
            .filter(|e| matches!(e, ProgressEvent::Started { .. }))
            .count()
    }

    /// Returns the number of `Completed` events.
    #[must_use]
    pub fn completed_count(&self) -> usize {
        self.events()
            .iter()
            .filter(|e| matches!(e, ProgressEvent::Completed { .. }))
            .count()
    }

    /// Returns the number of `Skipped` events.
    #[must_use]
    pub fn skipped_count(&self) -> usize {
        self.events()
            .iter()
            .filter(|e| matches!(e, ProgressEvent::Skipped { .. }))
            .count()
    }

    /// Returns the number of `Sampled` events.
    #[must_use]
    pub fn sampled_count(&self) -> usize {
        self.events()
            .iter()
            .filter(|e| matches!(e, ProgressEvent::Sampled { .. }))
            .count()
    }

    /// Returns the final `(sampled, skipped)` counts of a calibration run.
    #[must_use]
    pub fn sampling_counts(&self) -> Option<(usize, usize)> {
        self.events().iter().find_map(|e| match e {
            ProgressEvent::SamplingFinished { sampled, skipped } => Some((*sampled, *skipped)),
            _ => None,
        })
    }

    /// Returns whether a `Finished` event was received.
    #[must_use]
    pub fn has_finished(&self) -> bool {
        self.events()
            .iter()
            .any(|e| matches!(e, ProgressEvent::Finished { .. }))
    }

    /// Returns the final `(scored, blurry, failed)` counts, if finished.
    #[must_use]
    pub fn finished_counts(&self) -> Option<(usize, usize, usize)> {
        self.events().iter().find_map(|e| match e {
            ProgressEvent::Finished {
                scored,
                blurry,
                failed,
            } => Some((*scored, *blurry, *failed)),
            _ => None,
        })
    }
}

impl Default for MockProgressSink {
    fn default() -> Self {
        Self::new()
    }
}

impl ProgressSink for MockProgressSink {
    fn on_event(&self, event: ProgressEvent) {
        self.events
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(event);
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::SyntheticImageBuilder;
    use focus_qa_core::domain::{AlgorithmKind, ScoreOutcome};

    #[test]
    fn test_mock_image_source_empty() {
        let source = MockImageSource::empty();
        assert_eq!(source.count_hint(), Some(0));
        assert_eq!(source.images().count(), 0);
        assert_eq!(source.iteration_count(), 1);
    }

    #[test]
    fn test_mock_image_source_with_images() {
        let source = MockImageSource::new(vec![SyntheticImageBuilder::sharp_image()]);

        assert_eq!(source.count_hint(), Some(1));
        assert_eq!(source.images().count(), 1);
    }

    #[test]
    fn test_mock_image_source_failure() {
        let source = MockImageSource::new(vec![SyntheticImageBuilder::sharp_image()])
            .with_failure("broken.jpg");

        let items: Vec<_> = source.images().collect();
        assert_eq!(source.count_hint(), Some(2));
        assert!(items[0].is_ok());
        let err = items[1].as_ref().unwrap_err();
        assert_eq!(ImageLoadError::find(err).unwrap().path, "broken.jpg");
    }

    #[test]
    fn test_mock_result_output() {
        let output = MockResultOutput::new();

        let result = PerImageResult {
            path: "test.jpg".into(),
            timestamp: Some("2024-01-01T00:00:00Z".into()),
            algorithm: AlgorithmKind::Composite,
            strategy: None,
            calibrated: false,
            threshold: 30.0,
            outcome: ScoreOutcome::Error {
                message: "kernel error".into(),
            },
        };

        output.write(&result).unwrap();
        output.flush().unwrap();

        assert_eq!(output.results().len(), 1);
        assert_eq!(output.results()[0].path, "test.jpg");
        assert_eq!(output.flush_count(), 1);
    }

    #[test]
    fn test_mock_progress_sink() {
        let sink = MockProgressSink::new();

        sink.on_event(ProgressEvent::Started {
            path: "test.jpg".into(),
            index: 0,
            total: Some(1),
        });

        sink.on_event(ProgressEvent::Finished {
            scored: 1,
            blurry: 0,
            failed: 0,
        });

        assert_eq!(sink.started_count(), 1);
        assert!(sink.has_finished());
        assert_eq!(sink.finished_counts(), Some((1, 0, 0)));
    }
}

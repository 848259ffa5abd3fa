use std::path::PathBuf;

use crate::model::domain::embedding_extractor::EmbeddingExtractor;
use crate::model::infrastructure::model_resolver;
use crate::shared::constants::{EMBEDDING_INPUT_SIZE, EMBEDDING_MODEL_NAME, EMBEDDING_MODEL_URL};
use crate::shared::embedding::Embedding;
use crate::shared::error::SessionError;
use crate::shared::frame::Frame;

// ImageNet normalization the pretrained MobileNet expects.
const NORM_MEAN: [f32; 3] = [0.485, 0.456, 0.406];
const NORM_STD: [f32; 3] = [0.229, 0.224, 0.225];

/// MobileNet feature extractor backed by an ONNX Runtime session.
///
/// The model file is resolved lazily in `prepare`: user cache first, then an
/// optional bundled directory, then download. The raw network output is
/// L2-normalized so downstream distances behave uniformly.
pub struct OnnxEmbeddingExtractor {
    session: Option<ort::session::Session>,
    bundled_dir: Option<PathBuf>,
}

impl OnnxEmbeddingExtractor {
    pub fn new(bundled_dir: Option<PathBuf>) -> Self {
        Self {
            session: None,
            bundled_dir,
        }
    }
}

impl EmbeddingExtractor for OnnxEmbeddingExtractor {
    fn prepare(&mut self) -> Result<(), SessionError> {
        if self.session.is_some() {
            return Ok(());
        }
        let model_path = model_resolver::resolve(
            EMBEDDING_MODEL_NAME,
            EMBEDDING_MODEL_URL,
            self.bundled_dir.as_deref(),
        )
        .map_err(|e| SessionError::ModelLoadFailed(e.to_string()))?;

        let intra_threads = std::thread::available_parallelism()
            .map(|n| n.get())
            .unwrap_or(1);
        let session = ort::session::Session::builder()
            .and_then(|b| {
                Ok(b.with_optimization_level(
                    ort::session::builder::GraphOptimizationLevel::Level3,
                )?)
            })
            .and_then(|b| Ok(b.with_inter_threads(1)?))
            .and_then(|b| Ok(b.with_intra_threads(intra_threads)?))
            .and_then(|mut b| Ok(b.commit_from_file(&model_path)?))
            .map_err(|e| SessionError::ModelLoadFailed(e.to_string()))?;

        self.session = Some(session);
        log::info!("embedding model loaded from {}", model_path.display());
        Ok(())
    }

    fn embed(&mut self, frame: &Frame) -> Result<Embedding, SessionError> {
        let session = self
            .session
            .as_mut()
            .ok_or_else(|| SessionError::ModelLoadFailed("extractor not prepared".into()))?;

        let tensor = preprocess(frame);
        let input_value = ort::value::Tensor::from_array(tensor)
            .map_err(|e| SessionError::EmbeddingFailed(e.to_string()))?;
        let outputs = session
            .run(ort::inputs![input_value])
            .map_err(|e| SessionError::EmbeddingFailed(e.to_string()))?;
        let output_array = outputs[0]
            .try_extract_array::<f32>()
            .map_err(|e| SessionError::EmbeddingFailed(e.to_string()))?;
        let values = output_array
            .as_slice()
            .ok_or_else(|| SessionError::EmbeddingFailed("non-contiguous output".into()))?;

        let mut embedding = values.to_vec();
        l2_normalize(&mut embedding);
        Ok(Embedding::new(embedding))
    }
}

/// Nearest-neighbor resize to the model input size, ImageNet-normalize,
/// NCHW layout.
fn preprocess(frame: &Frame) -> ndarray::Array4<f32> {
    let src_w = frame.width() as usize;
    let src_h = frame.height() as usize;
    let data = frame.data();
    let size = EMBEDDING_INPUT_SIZE;

    let mut tensor = ndarray::Array4::<f32>::zeros((1, 3, size, size));
    for y in 0..size {
        let src_y = (((y as f64 + 0.5) * src_h as f64 / size as f64) as usize).min(src_h - 1);
        for x in 0..size {
            let src_x = (((x as f64 + 0.5) * src_w as f64 / size as f64) as usize).min(src_w - 1);
            let offset = (src_y * src_w + src_x) * 3;
            for c in 0..3 {
                let value = data[offset + c] as f32 / 255.0;
                tensor[[0, c, y, x]] = (value - NORM_MEAN[c]) / NORM_STD[c];
            }
        }
    }
    tensor
}

pub fn l2_normalize(v: &mut [f32]) {
    let norm: f32 = v.iter().map(|x| x * x).sum::<f32>().sqrt();
    if norm > 0.0 {
        for x in v.iter_mut() {
            *x /= norm;
        }
    }
}

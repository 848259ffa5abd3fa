pub mod knn_classifier;
pub mod model_resolver;
pub mod onnx_embedding_extractor;

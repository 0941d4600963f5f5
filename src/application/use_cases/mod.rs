pub mod analyze_image;
pub mod answer_question;
pub mod ingest_documents;

pub use analyze_image::{
    AnalyzeImageError, AnalyzeImageRequest, AnalyzeImageResponse, AnalyzeImageUseCase,
    DEFAULT_IMAGE_PROMPT,
};
pub use answer_question::{
    AnswerQuestionError, AnswerQuestionResponse, AnswerQuestionUseCase, AnswerSource,
};
pub use ingest_documents::{
    IngestDocumentsError, IngestDocumentsUseCase, IngestFailure, IngestReport, UploadedFile,
};

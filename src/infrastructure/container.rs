use std::sync::Arc;

use crate::{
    application::{
        ports::{
            DocumentLoader, EmbeddingProvider, FileStorage, LanguageModel, OcrEngine, VisionModel,
            WebSearch,
        },
        services::{EmbeddingIndexService, RecursiveCharacterSplitter},
        use_cases::{AnalyzeImageUseCase, AnswerQuestionUseCase, IngestDocumentsUseCase},
    },
    domain::repositories::VectorIndex,
    infrastructure::{
        config::AppConfig,
        external_services::{
            ChatCompletionsClient, EmbeddingsClientConfig, GeminiVisionClient, InferenceClient,
            InferenceEmbeddingProvider, RetryPolicy, TavilySearchClient, TesseractOcr,
            document_loaders::CompositeDocumentLoader,
        },
        file_system::TempFileStorage,
        vector_store::LocalVectorIndex,
    },
    presentation::http::{
        handlers::{ChatHandler, DocumentHandler, VisionHandler},
        session_store::SessionStore,
    },
};

pub struct AppContainer {
    pub config: AppConfig,

    // External Services
    pub embedding_provider: Arc<dyn EmbeddingProvider>,
    pub vector_index: Arc<dyn VectorIndex>,
    pub file_storage: Arc<dyn FileStorage>,
    pub document_loader: Arc<dyn DocumentLoader>,
    pub language_model: Arc<dyn LanguageModel>,
    pub web_search: Arc<dyn WebSearch>,
    pub vision_model: Arc<dyn VisionModel>,

    // Application Services
    pub embedding_index: Arc<EmbeddingIndexService>,

    // Use Cases
    pub ingest_documents_use_case: Arc<IngestDocumentsUseCase>,
    pub answer_question_use_case: Arc<AnswerQuestionUseCase>,
    pub analyze_image_use_case: Arc<AnalyzeImageUseCase>,

    // HTTP Handlers
    pub session_store: Arc<SessionStore>,
    pub document_handler: Arc<DocumentHandler>,
    pub chat_handler: Arc<ChatHandler>,
    pub vision_handler: Arc<VisionHandler>,
}

impl AppContainer {
    pub async fn new(config: AppConfig) -> Result<Self, Box<dyn std::error::Error>> {
        let timeout = config.provider_timeout_secs;
        let provider_retry = RetryPolicy::new(
            config.provider_max_retries,
            config.embedding.backoff_factor,
        );

        // Create external services
        let inference_client = InferenceClient::new(EmbeddingsClientConfig::from_settings(
            &config.embedding,
            timeout,
        ))
        .map_err(|e| format!("Failed to create embeddings client: {}", e))?;
        let embedding_provider: Arc<dyn EmbeddingProvider> =
            Arc::new(InferenceEmbeddingProvider::new(inference_client));

        let vector_index: Arc<dyn VectorIndex> =
            Arc::new(LocalVectorIndex::new(config.index_path.clone()));

        let temp_storage = TempFileStorage::new(config.temp_docs_path.clone());
        temp_storage
            .ensure_directory_exists()
            .await
            .map_err(|e| format!("Failed to prepare upload directory: {}", e))?;
        let file_storage: Arc<dyn FileStorage> = Arc::new(temp_storage);

        let ocr_engine: Arc<dyn OcrEngine> = Arc::new(TesseractOcr::new(config.ocr.clone()));
        let document_loader: Arc<dyn DocumentLoader> =
            Arc::new(CompositeDocumentLoader::new(ocr_engine));

        let language_model: Arc<dyn LanguageModel> = Arc::new(
            ChatCompletionsClient::new(config.language_model.clone(), timeout, provider_retry)
                .map_err(|e| format!("Failed to create language model client: {}", e))?,
        );
        let web_search: Arc<dyn WebSearch> = Arc::new(
            TavilySearchClient::new(config.search.clone(), timeout, provider_retry)
                .map_err(|e| format!("Failed to create web search client: {}", e))?,
        );
        let vision_model: Arc<dyn VisionModel> = Arc::new(
            GeminiVisionClient::new(config.vision.clone(), timeout, provider_retry)
                .map_err(|e| format!("Failed to create vision client: {}", e))?,
        );

        // Create application services
        let embedding_index = Arc::new(EmbeddingIndexService::new(
            embedding_provider.clone(),
            vector_index.clone(),
        ));
        let splitter = RecursiveCharacterSplitter::new(config.chunk_size, config.chunk_overlap)?;

        // Create use cases
        let ingest_documents_use_case = Arc::new(IngestDocumentsUseCase::new(
            file_storage.clone(),
            document_loader.clone(),
            splitter,
            embedding_index.clone(),
        ));

        let answer_question_use_case = Arc::new(AnswerQuestionUseCase::new(
            embedding_index.clone(),
            language_model.clone(),
            web_search.clone(),
            config.retrieval_k,
        ));

        let analyze_image_use_case = Arc::new(AnalyzeImageUseCase::new(vision_model.clone()));

        // Create HTTP handlers
        let session_store = Arc::new(SessionStore::with_capacity(config.max_chat_sessions));

        let document_handler = Arc::new(DocumentHandler::new(
            ingest_documents_use_case.clone(),
            embedding_index.clone(),
        ));
        let chat_handler = Arc::new(ChatHandler::new(
            answer_question_use_case.clone(),
            session_store.clone(),
        ));
        let vision_handler = Arc::new(VisionHandler::new(analyze_image_use_case.clone()));

        tracing::info!(
            "Container ready (index at {}, chunk size {}, overlap {}, k {})",
            config.index_path.display(),
            config.chunk_size,
            config.chunk_overlap,
            config.retrieval_k
        );

        Ok(Self {
            config,
            embedding_provider,
            vector_index,
            file_storage,
            document_loader,
            language_model,
            web_search,
            vision_model,
            embedding_index,
            ingest_documents_use_case,
            answer_question_use_case,
            analyze_image_use_case,
            session_store,
            document_handler,
            chat_handler,
            vision_handler,
        })
    }
}

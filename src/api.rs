//! REST API for a hashledger node
//!
//! Exposes mining, transaction submission and chain inspection over HTTP.
//! The ledger itself lives behind a shared `RwLock`; handlers only translate
//! between JSON and the core operations.

use axum::{
    body::Bytes,
    extract::{Path, Request, State},
    http::{self, StatusCode},
    middleware::{self, Next},
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::net::SocketAddr;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Instant;
use tokio::sync::{Mutex, RwLock};
use tower_http::cors::{AllowOrigin, CorsLayer};

use crate::blockchain::{Block, Blockchain};
use crate::error::ChainError;
use crate::miner::MiningTask;
use crate::transaction::{Amount, Transaction};

/// Shared node state handed to every request handler
#[derive(Clone)]
pub struct Node {
    pub blockchain: Arc<RwLock<Blockchain>>,
    /// Recipient of this node's mining rewards.
    pub node_identifier: String,
    // Optional orchestrator state (NodeState) for health checks and logging
    pub state: Option<Arc<RwLock<crate::node::NodeState>>>,
    mining_lock: Arc<Mutex<()>>,
    is_mining: Arc<AtomicBool>,
    blocks_mined: Arc<AtomicU64>,
    api_stats: Arc<RwLock<ApiStats>>,
}

/// API statistics and monitoring
#[derive(Debug, Default)]
struct ApiStats {
    total_requests: u64,
    successful_requests: u64,
    failed_requests: u64,
    transactions_submitted: u64,
    start_time: Option<Instant>,
}

impl ApiStats {
    fn new() -> Self {
        ApiStats {
            start_time: Some(Instant::now()),
            ..Default::default()
        }
    }

    fn record_request(&mut self, success: bool) {
        self.total_requests += 1;
        if success {
            self.successful_requests += 1;
        } else {
            self.failed_requests += 1;
        }
    }
}

/// Clears the mining flag however the mining future ends.
struct MiningFlag(Arc<AtomicBool>);

impl Drop for MiningFlag {
    fn drop(&mut self) {
        self.0.store(false, Ordering::SeqCst);
    }
}

impl Node {
    /// Create a node owning a fresh ledger handle.
    pub fn new(blockchain: Blockchain, node_identifier: impl Into<String>) -> Self {
        Self::new_shared(Arc::new(RwLock::new(blockchain)), node_identifier, None)
    }

    /// Create a node over an existing ledger handle, e.g. one owned by the
    /// orchestrator in `node.rs`.
    pub fn new_shared(
        blockchain: Arc<RwLock<Blockchain>>,
        node_identifier: impl Into<String>,
        state: Option<Arc<RwLock<crate::node::NodeState>>>,
    ) -> Self {
        Self {
            blockchain,
            node_identifier: node_identifier.into(),
            state,
            mining_lock: Arc::new(Mutex::new(())),
            is_mining: Arc::new(AtomicBool::new(false)),
            blocks_mined: Arc::new(AtomicU64::new(0)),
            api_stats: Arc::new(RwLock::new(ApiStats::new())),
        }
    }

    pub fn is_mining(&self) -> bool {
        self.is_mining.load(Ordering::Relaxed)
    }

    pub fn blocks_mined(&self) -> u64 {
        self.blocks_mined.load(Ordering::Relaxed)
    }

    /// Find the next proof and forge a block rewarding this node.
    ///
    /// Mining requests run one at a time. The search holds no ledger lock;
    /// the write lock is taken only once a proof exists, so an abandoned
    /// request leaves the pool and chain untouched.
    pub async fn mine(&self) -> Result<Block, ApiError> {
        let _guard = self.mining_lock.lock().await;
        self.is_mining.store(true, Ordering::SeqCst);
        let _flag = MiningFlag(self.is_mining.clone());

        let seed = self.blockchain.read().await.last_block().proof;
        let started = Instant::now();
        let proof = MiningTask::spawn(seed).proof().await?;

        let block = {
            let mut blockchain = self.blockchain.write().await;
            blockchain.forge_block(proof, &self.node_identifier).clone()
        };
        self.blocks_mined.fetch_add(1, Ordering::SeqCst);

        tracing::info!(
            index = block.index,
            proof,
            elapsed_ms = %started.elapsed().as_millis(),
            "new block forged"
        );
        Ok(block)
    }

    /// Get API statistics
    pub async fn get_stats(&self) -> ApiStatsResponse {
        let stats = self.api_stats.read().await;
        let uptime = stats.start_time.map(|t| t.elapsed().as_secs()).unwrap_or(0);

        ApiStatsResponse {
            total_requests: stats.total_requests,
            successful_requests: stats.successful_requests,
            failed_requests: stats.failed_requests,
            transactions_submitted: stats.transactions_submitted,
            uptime_seconds: uptime,
            blocks_mined: self.blocks_mined(),
            is_mining: self.is_mining(),
        }
    }
}

// ============================================================================
// API Error Handling
// ============================================================================

#[derive(Debug)]
pub enum ApiError {
    BlockchainError(ChainError),
    InvalidInput(String),
    NotFound(String),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            ApiError::BlockchainError(e @ ChainError::MiningCancelled) => {
                (StatusCode::SERVICE_UNAVAILABLE, e.to_string())
            }
            ApiError::BlockchainError(e) => (StatusCode::INTERNAL_SERVER_ERROR, e.to_string()),
            ApiError::InvalidInput(msg) => (StatusCode::BAD_REQUEST, msg),
            ApiError::NotFound(msg) => (StatusCode::NOT_FOUND, msg),
        };

        (status, Json(ErrorResponse { error: message })).into_response()
    }
}

impl From<ChainError> for ApiError {
    fn from(err: ChainError) -> Self {
        ApiError::BlockchainError(err)
    }
}

#[derive(Serialize)]
struct ErrorResponse {
    error: String,
}

// ============================================================================
// Request/Response Types
// ============================================================================

/// Submission body. Every field is optional here so that a missing one is
/// reported as "Missing values" rather than a parse failure.
#[derive(Debug, Deserialize)]
pub struct NewTransactionRequest {
    pub sender: Option<String>,
    pub recipient: Option<String>,
    pub amount: Option<Amount>,
}

impl NewTransactionRequest {
    fn into_transaction(self) -> Option<Transaction> {
        Some(Transaction {
            sender: self.sender?,
            recipient: self.recipient?,
            amount: self.amount?,
        })
    }
}

#[derive(Serialize)]
pub struct MineResponse {
    pub message: String,
    pub index: u64,
    pub transactions: Vec<Transaction>,
    pub proof: u64,
    pub previous_hash: String,
}

#[derive(Serialize)]
pub struct ChainResponse {
    pub chain: Vec<Block>,
    pub length: usize,
}

#[derive(Serialize)]
pub struct ValidationResponse {
    pub valid: bool,
    pub length: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

#[derive(Serialize)]
pub struct ApiStatsResponse {
    pub total_requests: u64,
    pub successful_requests: u64,
    pub failed_requests: u64,
    pub transactions_submitted: u64,
    pub uptime_seconds: u64,
    pub blocks_mined: u64,
    pub is_mining: bool,
}

#[derive(Serialize)]
struct MessageResponse {
    message: String,
}

// ============================================================================
// Middleware
// ============================================================================

async fn stats_middleware(State(node): State<Arc<Node>>, req: Request, next: Next) -> Response {
    let response = next.run(req).await;

    let success = response.status().is_success();
    node.api_stats.write().await.record_request(success);

    response
}

/// Logs method, path, status, duration and the current `NodeState` when one
/// is attached.
async fn logging_middleware(State(node): State<Arc<Node>>, req: Request, next: Next) -> Response {
    let start = Instant::now();
    let method = req.method().clone();
    let path = req.uri().path().to_string();

    let response = next.run(req).await;

    let duration = start.elapsed();
    let status = response.status();

    let node_state = match &node.state {
        Some(s) => format!("{:?}", s.read().await.clone()),
        None => "unknown".to_string(),
    };

    tracing::info!(
        method = %method,
        path = %path,
        status = %status.as_u16(),
        duration_ms = %duration.as_millis(),
        node_state = %node_state,
        "api.request"
    );

    response
}

// ============================================================================
// API Server
// ============================================================================

/// Build the router with all endpoints
pub fn build_api_router(node: Arc<Node>) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(AllowOrigin::mirror_request())
        .allow_methods(vec![
            http::Method::GET,
            http::Method::POST,
            http::Method::OPTIONS,
        ])
        .allow_headers(vec![http::header::CONTENT_TYPE]);

    Router::new()
        // Ledger endpoints
        .route("/mine", get(mine))
        .route(
            "/transactions/new",
            get(submit_transaction).post(submit_transaction),
        )
        .route("/transactions/pending", get(get_pending_transactions))
        .route("/chain", get(full_chain))
        .route("/chain/validate", get(validate_chain))
        .route("/block/:index", get(get_block_by_index))
        // System endpoints
        .route("/health", get(health_check))
        .route("/stats", get(get_api_stats))
        // logging before stats so we always record timing and node-state
        .layer(middleware::from_fn_with_state(node.clone(), logging_middleware))
        .layer(middleware::from_fn_with_state(node.clone(), stats_middleware))
        .with_state(node)
        .layer(cors)
}

/// Serve the API on `addr` until the listener fails.
pub async fn run_api_server(
    node: Arc<Node>,
    addr: SocketAddr,
) -> Result<(), Box<dyn std::error::Error>> {
    let app = build_api_router(node.clone());
    let listener = tokio::net::TcpListener::bind(addr).await?;

    tracing::info!(
        "API server listening on http://{} (node identifier {})",
        addr,
        node.node_identifier
    );

    axum::serve(listener, app).await?;

    Ok(())
}

// ============================================================================
// Route Handlers
// ============================================================================

async fn mine(State(node): State<Arc<Node>>) -> Result<Json<MineResponse>, ApiError> {
    let block = node.mine().await?;

    Ok(Json(MineResponse {
        message: "The new block has been forged".to_string(),
        index: block.index,
        transactions: block.transactions,
        proof: block.proof,
        previous_hash: block.previous_hash,
    }))
}

/// The body is read as JSON whatever its content type. Only an object with
/// named fields is accepted.
async fn submit_transaction(
    State(node): State<Arc<Node>>,
    body: Bytes,
) -> Result<(StatusCode, Json<MessageResponse>), ApiError> {
    let value: Value = serde_json::from_slice(&body)
        .map_err(|e| ApiError::InvalidInput(format!("Invalid transaction body: {}", e)))?;
    let tx = match value {
        Value::Object(_) => serde_json::from_value::<NewTransactionRequest>(value)
            .map_err(|e| ApiError::InvalidInput(format!("Invalid transaction body: {}", e)))?
            .into_transaction(),
        _ => None,
    }
    .ok_or_else(|| ApiError::InvalidInput("Missing values".to_string()))?;

    let index = node.blockchain.write().await.submit(tx);
    node.api_stats.write().await.transactions_submitted += 1;

    Ok((
        StatusCode::CREATED,
        Json(MessageResponse {
            message: format!("Transaction is scheduled to be added to Block No. {}", index),
        }),
    ))
}

async fn get_pending_transactions(State(node): State<Arc<Node>>) -> impl IntoResponse {
    let blockchain = node.blockchain.read().await;
    let transactions = blockchain.pending_transactions();
    Json(serde_json::json!({
        "count": transactions.len(),
        "transactions": transactions
    }))
}

async fn full_chain(State(node): State<Arc<Node>>) -> Json<ChainResponse> {
    let blockchain = node.blockchain.read().await;
    Json(ChainResponse {
        chain: blockchain.chain().to_vec(),
        length: blockchain.len(),
    })
}

async fn validate_chain(State(node): State<Arc<Node>>) -> Json<ValidationResponse> {
    let blockchain = node.blockchain.read().await;
    let result = blockchain.validate();
    Json(ValidationResponse {
        valid: result.is_ok(),
        length: blockchain.len(),
        error: result.err().map(|e| e.to_string()),
    })
}

async fn get_block_by_index(
    State(node): State<Arc<Node>>,
    Path(index): Path<u64>,
) -> Result<Json<Block>, ApiError> {
    let blockchain = node.blockchain.read().await;

    blockchain
        .block(index)
        .cloned()
        .map(Json)
        .ok_or_else(|| ApiError::NotFound(format!("Block {} not found", index)))
}

async fn health_check(State(node): State<Arc<Node>>) -> impl IntoResponse {
    let timestamp = chrono::Utc::now().to_rfc3339();
    match &node.state {
        Some(s) => {
            let state = s.read().await.clone();
            let (status, label) = if state == crate::node::NodeState::Ready {
                (StatusCode::OK, "healthy")
            } else {
                (StatusCode::SERVICE_UNAVAILABLE, "unhealthy")
            };
            (
                status,
                Json(serde_json::json!({
                    "status": label,
                    "node_state": format!("{:?}", state),
                    "timestamp": timestamp
                })),
            )
        }
        // No orchestrator state available, assume healthy
        None => (
            StatusCode::OK,
            Json(serde_json::json!({
                "status": "healthy",
                "timestamp": timestamp
            })),
        ),
    }
}

async fn get_api_stats(State(node): State<Arc<Node>>) -> impl IntoResponse {
    Json(node.get_stats().await)
}

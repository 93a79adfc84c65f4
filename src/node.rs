use crate::blockchain::Blockchain;
use crate::config::Config;
use crate::crypto::generate_node_identifier;
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::info;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NodeState {
    Booting,
    Ready,
}

/// Process-level orchestrator: owns the one ledger instance of this process
/// and hands shared handles to the services that need it.
pub struct Node {
    pub config: Config,
    pub node_identifier: String,
    pub blockchain: Arc<RwLock<Blockchain>>,
    pub state: Arc<RwLock<NodeState>>,
}

impl Node {
    pub fn init(config: Config) -> Self {
        let node_identifier = config
            .miner
            .node_identifier
            .clone()
            .unwrap_or_else(generate_node_identifier);

        let blockchain = Blockchain::new();
        info!(
            node_identifier = %node_identifier,
            genesis_hash = %blockchain.last_block().hash(),
            "ledger initialised"
        );

        Self {
            config,
            node_identifier,
            blockchain: Arc::new(RwLock::new(blockchain)),
            state: Arc::new(RwLock::new(NodeState::Booting)),
        }
    }

    pub async fn start(self: Arc<Self>) -> Result<(), Box<dyn std::error::Error>> {
        let addr = self.config.network.api_addr()?;

        *self.state.write().await = NodeState::Ready;

        Node::start_api(self, addr).await
    }

    #[cfg(feature = "api")]
    async fn start_api(
        node: Arc<Self>,
        addr: std::net::SocketAddr,
    ) -> Result<(), Box<dyn std::error::Error>> {
        let api_node = crate::api::Node::new_shared(
            node.blockchain.clone(),
            node.node_identifier.clone(),
            Some(node.state.clone()),
        );

        crate::api::run_api_server(Arc::new(api_node), addr).await
    }

    #[cfg(not(feature = "api"))]
    async fn start_api(
        _node: Arc<Self>,
        _addr: std::net::SocketAddr,
    ) -> Result<(), Box<dyn std::error::Error>> {
        Err("API feature not enabled in this build".into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_init_uses_configured_identifier() {
        let mut config = Config::default();
        config.miner.node_identifier = Some("miner-7".to_string());

        let node = Node::init(config);
        assert_eq!(node.node_identifier, "miner-7");
    }

    #[tokio::test]
    async fn test_init_generates_identifier_and_genesis() {
        let node = Node::init(Config::default());
        assert_eq!(node.node_identifier.len(), 32);
        assert_eq!(*node.state.read().await, NodeState::Booting);
        assert_eq!(node.blockchain.read().await.len(), 1);
    }
}

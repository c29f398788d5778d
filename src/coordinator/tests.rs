//! Coordinator Module Tests
//!
//! Validates the fan-out/fan-in orchestration against live storage nodes
//! on loopback sockets.
//!
//! ## Test Scopes
//! - **Routing**: shard i always lands on node endpoint i.
//! - **Degradation**: dead and silent nodes degrade only their own shard;
//!   the documented truncation and over-deletion hazards are reproduced,
//!   not fixed.
//! - **Aggregation**: delete's tri-state status and list's deduplicated
//!   union.
//! - **End to end**: the full client → coordinator → nodes path over the
//!   wire protocol.

#[cfg(test)]
mod tests {
    use crate::client::Client;
    use crate::config::{Config, NodeEndpoint};
    use crate::coordinator::partitioner;
    use crate::coordinator::server;
    use crate::coordinator::service::Coordinator;
    use crate::node;
    use crate::node::storage::ShardStore;
    use crate::protocol::types::{shard_name, DeleteStatus, STORE_ACK};
    use std::path::PathBuf;
    use std::sync::Arc;
    use std::time::Duration;
    use tokio::net::TcpListener;
    use tokio::task::JoinHandle;

    struct TestNode {
        endpoint: NodeEndpoint,
        store: Arc<ShardStore>,
        _dir: tempfile::TempDir,
        handle: JoinHandle<()>,
    }

    impl TestNode {
        // Aborts the server task and waits until its listener is gone, so
        // later connections are refused.
        async fn shut_down(self) {
            self.handle.abort();
            let _ = self.handle.await;
        }
    }

    async fn spawn_node() -> TestNode {
        let dir = tempfile::tempdir().unwrap();
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let port = listener.local_addr().unwrap().port();
        let store = Arc::new(ShardStore::open(dir.path(), port).await.unwrap());

        let server_store = store.clone();
        let handle = tokio::spawn(async move {
            let _ = node::server::run(listener, server_store).await;
        });

        TestNode {
            endpoint: NodeEndpoint {
                host: "127.0.0.1".to_string(),
                port,
            },
            store,
            _dir: dir,
            handle,
        }
    }

    async fn spawn_cluster(count: usize) -> Vec<TestNode> {
        let mut nodes = Vec::with_capacity(count);
        for _ in 0..count {
            nodes.push(spawn_node().await);
        }
        nodes
    }

    // A node that accepts connections but never answers anything.
    async fn spawn_silent_node() -> (NodeEndpoint, JoinHandle<()>) {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let port = listener.local_addr().unwrap().port();
        let handle = tokio::spawn(async move {
            let mut held = Vec::new();
            loop {
                match listener.accept().await {
                    Ok((stream, _)) => held.push(stream),
                    Err(_) => break,
                }
            }
        });
        (
            NodeEndpoint {
                host: "127.0.0.1".to_string(),
                port,
            },
            handle,
        )
    }

    fn test_config(endpoints: Vec<NodeEndpoint>, timeout_ms: u64) -> Arc<Config> {
        Arc::new(Config {
            coordinator_host: "127.0.0.1".to_string(),
            coordinator_port: 0,
            nodes: endpoints,
            node_port: 0,
            storage_path: PathBuf::from("."),
            node_timeout: Duration::from_millis(timeout_ms),
        })
    }

    fn coordinator_for(nodes: &[TestNode]) -> Coordinator {
        let endpoints = nodes.iter().map(|n| n.endpoint.clone()).collect();
        Coordinator::new(test_config(endpoints, 2000))
    }

    fn sample_bytes(len: usize) -> Vec<u8> {
        (0..len).map(|i| (i % 251) as u8).collect()
    }

    // Shard stores are fire-and-forget on the node side, so a store
    // acknowledgment can race the node's disk write. Poll until the shard
    // settles to the expected bytes before asserting anything further.
    async fn wait_for_shard(store: &ShardStore, name: &str, expected: &[u8]) {
        for _ in 0..200 {
            if store.fetch(name).await.unwrap().as_deref() == Some(expected) {
                return;
            }
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
        panic!("shard {} never settled to {} bytes", name, expected.len());
    }

    async fn wait_for_file(nodes: &[TestNode], file: &str, payload: &[u8]) {
        let ranges = partitioner::split(payload.len(), nodes.len());
        for (i, range) in ranges.into_iter().enumerate() {
            let shard = shard_name(file, (i + 1) as u32);
            wait_for_shard(&nodes[i].store, &shard, &payload[range]).await;
        }
    }

    // ============================================================
    // ROUTING TESTS
    // ============================================================

    #[tokio::test]
    async fn test_store_routes_shard_i_to_node_i() {
        let nodes = spawn_cluster(3).await;
        let coordinator = coordinator_for(&nodes);
        let payload = sample_bytes(9000);

        coordinator.store("report.bin", &payload).await;
        wait_for_file(&nodes, "report.bin", &payload).await;

        for (i, test_node) in nodes.iter().enumerate() {
            let shard = shard_name("report.bin", (i + 1) as u32);
            let expected = payload[i * 3000..(i + 1) * 3000].to_vec();
            assert_eq!(
                test_node.store.fetch(&shard).await.unwrap(),
                Some(expected),
                "node {} must hold exactly shard {}",
                i,
                i + 1
            );
        }
    }

    #[tokio::test]
    async fn test_routing_is_stable_across_repeated_stores() {
        let nodes = spawn_cluster(3).await;
        let coordinator = coordinator_for(&nodes);

        for round in 0..3u8 {
            let payload = vec![round; 300];
            coordinator.store("repeat.bin", &payload).await;
            wait_for_file(&nodes, "repeat.bin", &payload).await;

            for (i, test_node) in nodes.iter().enumerate() {
                let shard = shard_name("repeat.bin", (i + 1) as u32);
                assert_eq!(
                    test_node.store.fetch(&shard).await.unwrap(),
                    Some(vec![round; 100]),
                    "round {}: shard {} must still map to node {}",
                    round,
                    i + 1,
                    i
                );
            }
        }
    }

    // ============================================================
    // FETCH TESTS
    // ============================================================

    #[tokio::test]
    async fn test_fetch_reassembles_full_file() {
        let nodes = spawn_cluster(3).await;
        let coordinator = coordinator_for(&nodes);
        let payload = sample_bytes(9001);

        coordinator.store("report.bin", &payload).await;
        wait_for_file(&nodes, "report.bin", &payload).await;

        assert_eq!(coordinator.fetch("report.bin").await, Some(payload));
    }

    #[tokio::test]
    async fn test_fetch_unknown_file_is_not_found() {
        let nodes = spawn_cluster(3).await;
        let coordinator = coordinator_for(&nodes);

        assert_eq!(coordinator.fetch("nothing.bin").await, None);
    }

    #[tokio::test]
    async fn test_partial_fetch_returns_truncated_bytes() {
        // The documented hazard: with node 2 unreachable, fetch still
        // reports found and returns shard1 ++ shard3 — shorter than the
        // original, no padding, no error.
        let mut nodes = spawn_cluster(3).await;
        let coordinator = coordinator_for(&nodes);
        let payload = sample_bytes(9000);

        coordinator.store("report.bin", &payload).await;
        wait_for_file(&nodes, "report.bin", &payload).await;
        nodes.remove(1).shut_down().await;

        let fetched = coordinator.fetch("report.bin").await.unwrap();

        let mut expected = payload[0..3000].to_vec();
        expected.extend_from_slice(&payload[6000..9000]);
        assert_eq!(fetched.len(), 6000);
        assert_eq!(fetched, expected);
    }

    #[tokio::test]
    async fn test_empty_file_roundtrip_is_found() {
        let nodes = spawn_cluster(3).await;
        let coordinator = coordinator_for(&nodes);

        coordinator.store("empty.bin", b"").await;
        wait_for_file(&nodes, "empty.bin", b"").await;

        for (i, test_node) in nodes.iter().enumerate() {
            let shard = shard_name("empty.bin", (i + 1) as u32);
            assert_eq!(
                test_node.store.fetch(&shard).await.unwrap(),
                Some(Vec::new()),
                "every node gets its zero-length shard"
            );
        }

        assert_eq!(
            coordinator.fetch("empty.bin").await,
            Some(Vec::new()),
            "all shards present: found with 0 bytes"
        );
    }

    // ============================================================
    // DELETE AGGREGATION TESTS
    // ============================================================

    #[tokio::test]
    async fn test_delete_everywhere_is_all_deleted() {
        let nodes = spawn_cluster(3).await;
        let coordinator = coordinator_for(&nodes);
        let payload = sample_bytes(300);

        coordinator.store("report.bin", &payload).await;
        wait_for_file(&nodes, "report.bin", &payload).await;

        assert_eq!(
            coordinator.delete("report.bin").await,
            DeleteStatus::AllDeleted
        );
        for test_node in &nodes {
            assert!(test_node.store.list().await.is_empty());
        }
    }

    #[tokio::test]
    async fn test_delete_unknown_file_is_failed() {
        let nodes = spawn_cluster(3).await;
        let coordinator = coordinator_for(&nodes);

        assert_eq!(
            coordinator.delete("nothing.bin").await,
            DeleteStatus::Failed
        );
    }

    #[tokio::test]
    async fn test_delete_with_dead_node_is_partial() {
        let mut nodes = spawn_cluster(3).await;
        let coordinator = coordinator_for(&nodes);
        let payload = sample_bytes(300);

        coordinator.store("report.bin", &payload).await;
        wait_for_file(&nodes, "report.bin", &payload).await;
        nodes.remove(2).shut_down().await;

        assert_eq!(
            coordinator.delete("report.bin").await,
            DeleteStatus::Partial,
            "some nodes deleted, one erred"
        );
    }

    #[tokio::test]
    async fn test_delete_with_all_nodes_dead_is_failed() {
        let nodes = spawn_cluster(3).await;
        let coordinator = coordinator_for(&nodes);
        for test_node in nodes {
            test_node.shut_down().await;
        }

        assert_eq!(
            coordinator.delete("report.bin").await,
            DeleteStatus::Failed
        );
    }

    // ============================================================
    // LIST AGGREGATION TESTS
    // ============================================================

    #[tokio::test]
    async fn test_list_unions_raw_shard_names() {
        let nodes = spawn_cluster(3).await;
        let coordinator = coordinator_for(&nodes);

        for (i, test_node) in nodes.iter().enumerate() {
            let shard = shard_name("demo.bin", (i + 1) as u32);
            test_node.store.store(&shard, b"x").await.unwrap();
        }

        assert_eq!(
            coordinator.list().await,
            vec![
                "demo.bin.part1".to_string(),
                "demo.bin.part2".to_string(),
                "demo.bin.part3".to_string(),
            ],
            "clients see shard names, not the logical file name"
        );
    }

    #[tokio::test]
    async fn test_list_deduplicates_across_nodes() {
        let nodes = spawn_cluster(3).await;
        let coordinator = coordinator_for(&nodes);

        nodes[0].store.store("same.part1", b"a").await.unwrap();
        nodes[1].store.store("same.part1", b"b").await.unwrap();

        assert_eq!(coordinator.list().await, vec!["same.part1".to_string()]);
    }

    #[tokio::test]
    async fn test_list_skips_unreachable_nodes() {
        let mut nodes = spawn_cluster(3).await;
        let coordinator = coordinator_for(&nodes);

        nodes[0].store.store("a.part1", b"x").await.unwrap();
        nodes[1].store.store("b.part2", b"y").await.unwrap();
        nodes.remove(1).shut_down().await;

        assert_eq!(coordinator.list().await, vec!["a.part1".to_string()]);
    }

    // ============================================================
    // TIMEOUT ISOLATION TESTS
    // ============================================================

    #[tokio::test]
    async fn test_silent_node_degrades_only_its_own_shard() {
        let nodes = spawn_cluster(3).await;
        let payload = sample_bytes(9000);
        coordinator_for(&nodes).store("report.bin", &payload).await;
        wait_for_file(&nodes, "report.bin", &payload).await;

        // Same cluster, but node 2 replaced by one that accepts and never
        // answers; the round-trip bound must cut it off.
        let (silent, _silent_handle) = spawn_silent_node().await;
        let endpoints = vec![
            nodes[0].endpoint.clone(),
            silent,
            nodes[2].endpoint.clone(),
        ];
        let coordinator = Coordinator::new(test_config(endpoints, 300));

        let started = std::time::Instant::now();
        let fetched = coordinator.fetch("report.bin").await.unwrap();

        let mut expected = payload[0..3000].to_vec();
        expected.extend_from_slice(&payload[6000..9000]);
        assert_eq!(fetched, expected, "the other two shards still arrive");
        assert!(
            started.elapsed() < Duration::from_secs(2),
            "a silent node must not stall the operation past its bound"
        );
    }

    // ============================================================
    // END-TO-END (CLIENT OVER THE WIRE)
    // ============================================================

    async fn spawn_coordinator(nodes: &[TestNode]) -> Client {
        let endpoints = nodes.iter().map(|n| n.endpoint.clone()).collect();
        let coordinator = Arc::new(Coordinator::new(test_config(endpoints, 2000)));
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let port = listener.local_addr().unwrap().port();
        tokio::spawn(async move {
            let _ = server::run(listener, coordinator).await;
        });
        Client::new("127.0.0.1", port)
    }

    #[tokio::test]
    async fn test_full_lifecycle_over_the_wire() {
        let nodes = spawn_cluster(3).await;
        let client = spawn_coordinator(&nodes).await;
        let payload = sample_bytes(3000);

        let ack = client.store("cycle.bin", &payload).await.unwrap();
        assert_eq!(ack, STORE_ACK);
        wait_for_file(&nodes, "cycle.bin", &payload).await;

        assert_eq!(client.fetch("cycle.bin").await.unwrap(), Some(payload));

        let listed = client.list().await.unwrap();
        assert_eq!(
            listed,
            vec![
                "cycle.bin.part1".to_string(),
                "cycle.bin.part2".to_string(),
                "cycle.bin.part3".to_string(),
            ]
        );

        assert_eq!(
            client.delete("cycle.bin").await.unwrap(),
            DeleteStatus::AllDeleted
        );
        assert_eq!(client.fetch("cycle.bin").await.unwrap(), None);
        assert!(client.list().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_store_acks_even_when_a_node_is_down() {
        // Store reports no per-node outcomes: the generic acknowledgment
        // arrives even though one shard had nowhere to go.
        let mut nodes = spawn_cluster(3).await;
        let client = spawn_coordinator(&nodes).await;
        nodes.remove(1).shut_down().await;

        let payload = sample_bytes(300);
        let ack = client.store("degraded.bin", &payload).await.unwrap();

        assert_eq!(ack, STORE_ACK);
        wait_for_shard(&nodes[0].store, "degraded.bin.part1", &payload[0..100]).await;
    }
}

use memsim::memory::{allocator::AllocationStrategy, block::MemoryBlock};
use memsim::net::{client::SimClient, server::serve};
use memsim::paging::{frame_table::AccessResult, replacement::PagingPolicy};
use memsim::session::SimulationSession;
use tokio::net::TcpListener;

async fn start(total: usize, frames: usize) -> SimClient {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let session = SimulationSession::new(total, frames).unwrap();
    tokio::spawn(serve(listener, session));
    SimClient::new(&format!("http://{}", addr))
}

#[tokio::test]
async fn test_allocation_round_trip() {
    let client = start(512, 3).await;
    assert_eq!(client.allocate(AllocationStrategy::FirstFit, 1, 100).await.unwrap(), 0);
    assert_eq!(client.allocate(AllocationStrategy::BestFit, 2, 50).await.unwrap(), 100);
    assert_eq!(client.deallocate(1).await.unwrap(), 100);

    let blocks = client.snapshot().await.unwrap();
    assert_eq!(
        blocks,
        vec![
            MemoryBlock::free(0, 100),
            MemoryBlock::owned(100, 50, 2),
            MemoryBlock::free(150, 362),
        ]
    );
    let stats = client.stats().await.unwrap();
    assert_eq!(stats.free_blocks, 2);
    assert_eq!(stats.used, 50);
}

#[tokio::test]
async fn test_errors_are_reported() {
    let client = start(64, 2).await;
    let err = client.deallocate(5).await.unwrap_err();
    assert!(err.to_string().contains("process_not_found"), "{}", err);
    let err = client.allocate(AllocationStrategy::FirstFit, 1, 65).await.unwrap_err();
    assert!(err.to_string().contains("insufficient_memory"), "{}", err);
    let err = client.allocate(AllocationStrategy::FirstFit, 1, 0).await.unwrap_err();
    assert!(err.to_string().contains("invalid_request"), "{}", err);
}

#[tokio::test]
async fn test_paging_round_trip() {
    let client = start(64, 3).await;
    for page in [1, 2, 3, 1] {
        client.access_page(PagingPolicy::Lru, page).await.unwrap();
    }
    let result = client.access_page(PagingPolicy::Lru, 4).await.unwrap();
    assert_eq!(result, AccessResult::Fault { page: 4, evicted: Some(2), slot: 1 });
    assert!(client.access_page(PagingPolicy::Fifo, 5).await.is_err());

    let stats = client.paging_stats().await.unwrap();
    assert_eq!((stats.hits, stats.faults), (1, 4));
    assert_eq!(client.frames().await.unwrap(), vec![Some(1), Some(4), Some(3)]);

    let frames = client.reset_paging(Some(2)).await.unwrap();
    assert_eq!(frames, vec![None, None]);
    assert!(client.access_page(PagingPolicy::Fifo, 5).await.unwrap().evicted().is_none());
}

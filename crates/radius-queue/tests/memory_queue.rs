use radius_queue::{MemoryQueue, Queue};
use radius_shared::time::Duration;

#[tokio::test]
async fn fifo_ordering_is_preserved_across_dequeues() {
    let queue: MemoryQueue<u32> = MemoryQueue::new(5);
    for item in [1, 2, 3] {
        queue.enqueue(item).await.unwrap();
    }

    let mut seen = Vec::new();
    for _ in 0..3 {
        let message = queue
            .dequeue(Duration::from_secs(30))
            .await
            .unwrap()
            .unwrap();
        seen.push(message.data);
        queue.finish(&message.id, message.lock_token).await.unwrap();
    }

    assert_eq!(seen, vec![1, 2, 3]);
}

#[tokio::test(start_paused = true)]
async fn extending_a_lock_keeps_the_message_invisible() {
    let queue: MemoryQueue<u32> = MemoryQueue::new(5);
    queue.enqueue(7).await.unwrap();

    let message = queue
        .dequeue(Duration::from_secs(1))
        .await
        .unwrap()
        .unwrap();
    queue
        .extend(&message.id, message.lock_token, Duration::from_secs(30))
        .await
        .unwrap();

    tokio::time::sleep(std::time::Duration::from_millis(1100)).await;
    let redelivered = queue.dequeue(Duration::from_secs(30)).await.unwrap();
    assert!(redelivered.is_none(), "extend should have kept the lock alive");
}

use std::future::Future;

/// Runs every future as its own task and collects the outputs by input position.
///
/// Slot `i` holds the output of `futures[i]` regardless of completion order. A
/// task that panics leaves its slot `None` without affecting the others.
/// Tasks are detached: if the caller is dropped mid-await, in-flight tasks run
/// to completion and their outputs are discarded.
pub async fn join_ordered<T, Fut>(futures: Vec<Fut>) -> Vec<Option<T>>
where
    Fut: Future<Output = T> + Send + 'static,
    T: Send + 'static,
{
    let tasks: Vec<_> = futures.into_iter().map(tokio::spawn).collect();

    let mut slots = Vec::with_capacity(tasks.len());
    for (index, task) in tasks.into_iter().enumerate() {
        match task.await {
            Ok(output) => slots.push(Some(output)),
            Err(e) => {
                tracing::error!(error = %e, index, "Task join error");
                slots.push(None);
            }
        }
    }

    slots
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[tokio::test]
    async fn test_preserves_input_order() {
        // Earlier items finish last
        let futures: Vec<_> = (0..5u64)
            .map(|i| async move {
                tokio::time::sleep(Duration::from_millis((5 - i) * 10)).await;
                i
            })
            .collect();

        let slots = join_ordered(futures).await;
        assert_eq!(slots, vec![Some(0), Some(1), Some(2), Some(3), Some(4)]);
    }

    #[tokio::test]
    async fn test_panicking_task_is_isolated() {
        let futures: Vec<std::pin::Pin<Box<dyn Future<Output = u32> + Send>>> = vec![
            Box::pin(async { 1 }),
            Box::pin(async {
                let fail = true;
                if fail {
                    panic!("lookup exploded");
                }
                2
            }),
            Box::pin(async { 3 }),
        ];

        let slots = join_ordered(futures).await;
        assert_eq!(slots, vec![Some(1), None, Some(3)]);
    }

    #[tokio::test]
    async fn test_empty_input() {
        let futures: Vec<std::future::Ready<u8>> = Vec::new();
        assert!(join_ordered(futures).await.is_empty());
    }
}

//! Ordered, fail-fast execution of deferred operations

use std::future::Future;

use tracing::debug;

/// Boxed, sendable future used for type-erased tasks
pub type BoxFuture<T> = futures::future::BoxFuture<'static, T>;

/// One unit of work for [`sequential`]
///
/// A `Future` task is an operation that was already constructed by the
/// caller; it makes no progress until the runner polls it. A `Deferred` task
/// is built on demand, right before it runs, so nothing about it exists until
/// every earlier task succeeded.
pub enum Task<T, E> {
    Future(BoxFuture<Result<T, E>>),
    Deferred(Box<dyn FnOnce() -> BoxFuture<Result<T, E>> + Send>),
}

impl<T, E> Task<T, E> {
    /// Wrap an already-constructed future
    pub fn future<F>(future: F) -> Self
    where
        F: Future<Output = Result<T, E>> + Send + 'static,
    {
        Self::Future(Box::pin(future))
    }

    /// Wrap a closure that starts the operation when the runner reaches it
    pub fn deferred<F, Fut>(start: F) -> Self
    where
        F: FnOnce() -> Fut + Send + 'static,
        Fut: Future<Output = Result<T, E>> + Send + 'static,
    {
        Self::Deferred(Box::new(move || Box::pin(start())))
    }

    fn launch(self) -> BoxFuture<Result<T, E>> {
        match self {
            Self::Future(future) => future,
            Self::Deferred(start) => start(),
        }
    }
}

impl<T, E> std::fmt::Debug for Task<T, E> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Future(_) => write!(f, "Task::Future"),
            Self::Deferred(_) => write!(f, "Task::Deferred"),
        }
    }
}

/// Run tasks one at a time, in order, collecting their results
///
/// Task `i + 1` is launched only after task `i` resolved successfully. The
/// first error stops the run; later tasks are dropped without being polled.
/// Control is handed back to the scheduler between items so long lists do
/// not starve other pending work.
pub async fn sequential<T, E>(tasks: Vec<Task<T, E>>) -> Result<Vec<T>, E> {
    debug!(count = tasks.len(), "sequential: called");
    let mut values = Vec::with_capacity(tasks.len());

    for (index, task) in tasks.into_iter().enumerate() {
        match task.launch().await {
            Ok(value) => values.push(value),
            Err(e) => {
                debug!(index, "sequential: task failed, skipping remaining tasks");
                return Err(e);
            }
        }
        tokio::task::yield_now().await;
    }

    debug!(count = values.len(), "sequential: all tasks completed");
    Ok(values)
}

/// Map each item to a deferred task and run them with [`sequential`]
pub async fn sequential_fn<I, F, Fut, T, E>(items: I, start: F) -> Result<Vec<T>, E>
where
    I: IntoIterator,
    I::Item: Send + 'static,
    F: Fn(I::Item) -> Fut + Clone + Send + 'static,
    Fut: Future<Output = Result<T, E>> + Send + 'static,
{
    let tasks = items
        .into_iter()
        .map(|item| {
            let start = start.clone();
            Task::deferred(move || start(item))
        })
        .collect();
    sequential(tasks).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::{Arc, Mutex};
    use std::time::Duration;

    use proptest::prelude::*;

    fn recording_task(log: Arc<Mutex<Vec<String>>>, id: usize, fail: bool) -> Task<usize, String> {
        Task::deferred(move || async move {
            log.lock().unwrap().push(format!("start {}", id));
            tokio::time::sleep(Duration::from_millis(1)).await;
            log.lock().unwrap().push(format!("end {}", id));
            if fail { Err(format!("task {} failed", id)) } else { Ok(id) }
        })
    }

    #[tokio::test]
    async fn test_empty_list_resolves_empty() {
        let result: Result<Vec<u32>, String> = sequential(vec![]).await;
        assert_eq!(result.unwrap(), Vec::<u32>::new());
    }

    #[tokio::test]
    async fn test_results_in_input_order() {
        let tasks: Vec<Task<u32, String>> = vec![
            Task::future(async { Ok(1) }),
            Task::deferred(|| async { Ok(2) }),
            Task::future(async { Ok(3) }),
        ];

        assert_eq!(sequential(tasks).await.unwrap(), vec![1, 2, 3]);
    }

    #[tokio::test]
    async fn test_next_task_starts_after_previous_settles() {
        let log = Arc::new(Mutex::new(Vec::new()));
        let tasks = (0..3).map(|i| recording_task(log.clone(), i, false)).collect();

        sequential(tasks).await.unwrap();

        let log = log.lock().unwrap().clone();
        assert_eq!(log, vec!["start 0", "end 0", "start 1", "end 1", "start 2", "end 2"]);
    }

    #[tokio::test]
    async fn test_first_failure_stops_the_run() {
        let log = Arc::new(Mutex::new(Vec::new()));
        let tasks = (0..4).map(|i| recording_task(log.clone(), i, i == 1)).collect();

        let err = sequential(tasks).await.unwrap_err();

        assert_eq!(err, "task 1 failed");
        let log = log.lock().unwrap().clone();
        assert!(!log.iter().any(|entry| entry.ends_with(" 2") || entry.ends_with(" 3")));
    }

    #[tokio::test]
    async fn test_future_tasks_are_not_polled_after_failure() {
        let polled = Arc::new(Mutex::new(false));
        let flag = polled.clone();
        let tasks: Vec<Task<(), &str>> = vec![
            Task::future(async { Err("boom") }),
            Task::future(async move {
                *flag.lock().unwrap() = true;
                Ok(())
            }),
        ];

        assert_eq!(sequential(tasks).await.unwrap_err(), "boom");
        assert!(!*polled.lock().unwrap());
    }

    #[tokio::test]
    async fn test_long_list_does_not_grow_stack() {
        let tasks: Vec<Task<usize, ()>> = (0..20_000).map(|i| Task::future(async move { Ok(i) })).collect();

        let values = sequential(tasks).await.unwrap();
        assert_eq!(values.len(), 20_000);
        assert_eq!(values[19_999], 19_999);
    }

    #[tokio::test(flavor = "current_thread")]
    async fn test_yields_to_scheduler_between_items() {
        let ticks = Arc::new(AtomicUsize::new(0));
        let ticker = {
            let ticks = ticks.clone();
            tokio::spawn(async move {
                loop {
                    ticks.fetch_add(1, Ordering::SeqCst);
                    tokio::task::yield_now().await;
                }
            })
        };

        let tasks: Vec<Task<usize, ()>> = (0..5)
            .map(|_| {
                let ticks = ticks.clone();
                Task::deferred(move || async move { Ok(ticks.load(Ordering::SeqCst)) })
            })
            .collect();
        let seen = sequential(tasks).await.unwrap();
        ticker.abort();

        assert!(seen.windows(2).all(|pair| pair[0] < pair[1]), "ticker starved: {:?}", seen);
    }

    #[tokio::test]
    async fn test_sequential_fn_maps_items() {
        let values = sequential_fn(vec!["a", "bb", "ccc"], |s: &'static str| async move { Ok::<_, ()>(s.len()) })
            .await
            .unwrap();
        assert_eq!(values, vec![1, 2, 3]);
    }

    proptest! {
        #[test]
        fn prop_failure_at_k_launches_exactly_k_plus_one(n in 1usize..40, k_seed in 0usize..40) {
            let k = k_seed % n;
            let runtime = tokio::runtime::Builder::new_current_thread().enable_all().build().unwrap();
            let started = Arc::new(Mutex::new(Vec::new()));

            let tasks: Vec<Task<usize, usize>> = (0..n)
                .map(|i| {
                    let started = started.clone();
                    Task::deferred(move || async move {
                        started.lock().unwrap().push(i);
                        if i == k { Err(i) } else { Ok(i) }
                    })
                })
                .collect();

            let result = runtime.block_on(sequential(tasks));

            prop_assert_eq!(result, Err(k));
            prop_assert_eq!(started.lock().unwrap().clone(), (0..=k).collect::<Vec<_>>());
        }
    }
}

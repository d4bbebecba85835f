//! Load testing for the worker service.

use std::time::Instant;

use devops_services::config::ServiceKind;
use serde_json::{json, Value};

mod common;

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_submissions() {
    let service = common::start_default(ServiceKind::Worker).await;

    let concurrency = 20;
    let requests_per_task = 25;
    let total_requests = concurrency * requests_per_task;

    let client = common::client();
    let start = Instant::now();

    let mut tasks = Vec::new();
    for worker in 0..concurrency {
        let client = client.clone();
        let url = service.url("/tasks");
        tasks.push(tokio::spawn(async move {
            let mut ids = Vec::new();
            for i in 0..requests_per_task {
                let res = client
                    .post(&url)
                    .json(&json!({"name": format!("job-{}-{}", worker, i)}))
                    .send()
                    .await
                    .unwrap();
                assert_eq!(res.status(), 201);
                let task: Value = res.json().await.unwrap();
                ids.push(task["id"].as_str().unwrap().to_string());
            }
            ids
        }));
    }

    let mut all_ids = Vec::new();
    for task in tasks {
        all_ids.extend(task.await.unwrap());
    }
    let duration = start.elapsed();

    all_ids.sort();
    all_ids.dedup();
    assert_eq!(all_ids.len(), total_requests, "task ids must be unique");

    let status: Value = client.get(service.url("/status")).send().await.unwrap().json().await.unwrap();
    assert_eq!(status["total_tasks"], total_requests);
    assert_eq!(status["completed"], total_requests);
    assert_eq!(status["pending"], 0);

    let metrics = client.get(service.url("/metrics")).send().await.unwrap().text().await.unwrap();
    let expected = format!(
        r#"worker_requests_total{{method="POST",path="/tasks",status="201"}} {}"#,
        total_requests
    );
    assert!(metrics.contains(&expected));

    println!("\n--- Load Test Results ---");
    println!("Total Requests: {}", total_requests);
    println!("Concurrency:    {}", concurrency);
    println!("Total Duration: {:?}", duration);
    println!("Requests/sec:   {:.2}", total_requests as f64 / duration.as_secs_f64());
    println!("-------------------------\n");

    service.stop().await;
}

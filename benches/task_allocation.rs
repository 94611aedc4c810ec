use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion};
use swarm_substrate::config::DecConfig;
use swarm_substrate::dec::DecisionEngine;
use swarm_substrate::domain::geometry::Vec3;
use swarm_substrate::domain::models::agent::AgentState;
use swarm_substrate::domain::models::task::Task;

fn swarm_with_agents(n: usize) -> DecisionEngine {
    let engine = DecisionEngine::new(DecConfig::default());
    engine.start();
    let rt = tokio::runtime::Runtime::new().unwrap();
    rt.block_on(async {
        for i in 0..n {
            let mut agent = AgentState::new(format!("a{i}"), 0)
                .with_position(Vec3::new(i as f32, 0.0, 0.0));
            agent.capabilities.insert("sensing".to_string(), 0.8);
            engine.add_agent(agent).await;
        }
        for i in 0..(n / 4).max(1) {
            let task = Task::new(format!("task-{i}"))
                .with_required_capabilities(vec!["sensing".to_string()]);
            engine.add_task(task).await;
        }
    });
    engine
}

fn bench_allocate_tasks(c: &mut Criterion) {
    let rt = tokio::runtime::Runtime::new().unwrap();
    let mut group = c.benchmark_group("allocate_tasks");
    for &n in &[10usize, 50, 200] {
        group.bench_with_input(BenchmarkId::from_parameter(n), &n, |b, &n| {
            let engine = swarm_with_agents(n);
            b.iter(|| rt.block_on(engine.allocate_tasks()));
        });
    }
    group.finish();
}

fn bench_reassign_roles(c: &mut Criterion) {
    let rt = tokio::runtime::Runtime::new().unwrap();
    let mut group = c.benchmark_group("reassign_roles");
    for &n in &[10usize, 50, 200] {
        group.bench_with_input(BenchmarkId::from_parameter(n), &n, |b, &n| {
            let engine = swarm_with_agents(n);
            b.iter(|| rt.block_on(engine.reassign_roles()));
        });
    }
    group.finish();
}

criterion_group!(benches, bench_allocate_tasks, bench_reassign_roles);
criterion_main!(benches);

//! Quick benchmark to verify schema resolution and bind performance

use std::time::{Duration, Instant};

use paramstore::convert::parse_duration;
use paramstore::{record, MemorySource, ParamStore, Parameter};

record! {
    #[derive(Debug, Default)]
    pub struct Database {
        pub user: String [ssm = "user"],
        pub password: String [ssm = "password"],
        pub hosts: Vec<String> [ssm = "hosts"],
        pub port: u16 [ssm = "port"],
    }
}

record! {
    #[derive(Debug, Default)]
    pub struct Service {
        pub name: String [ssm = "name"],
        pub timeout: Duration [ssm = "timeout"],
        pub primary: Database [ssm = "primary"],
        pub replica: Option<Database> [ssm = "replica"],
    }
}

fn params() -> Vec<Parameter> {
    let mut params = vec![
        Parameter::string("/bench/name", "billing"),
        Parameter::string("/bench/timeout", "1m30s"),
    ];
    for db in ["primary", "replica"] {
        params.push(Parameter::string(format!("/bench/{db}/user"), "svc"));
        params.push(Parameter::secure_string(format!("/bench/{db}/password"), "pw"));
        params.push(Parameter::string_list(format!("/bench/{db}/hosts"), "db1,db2,db3"));
        params.push(Parameter::string(format!("/bench/{db}/port"), "5432"));
    }
    params
}

fn report(label: &str, iterations: u32, elapsed: Duration) {
    println!("{}", label);
    println!("  Time for {} iterations: {:?}", iterations, elapsed);
    println!("  Per operation: {:?}\n", elapsed / iterations);
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::WARN.into()),
        )
        .init();

    let store = ParamStore::builder()
        .with_prefix("bench")
        .with_parse_duration()
        .with_parse_number()
        .with_source(MemorySource::with_params(params()))
        .build()
        .unwrap();

    println!("Bind Performance Test");
    println!("=====================\n");

    // Schema resolution
    let iterations = 100_000;
    let target = Service::default();
    let start = Instant::now();
    for _ in 0..iterations {
        let _ = store.schema(&target);
    }
    report("Schema resolution (10 keys, 2 nested)", iterations, start.elapsed());

    // Full bind against the in-memory source
    let runtime = tokio::runtime::Builder::new_current_thread()
        .build()
        .unwrap();
    let iterations = 50_000;
    let start = Instant::now();
    runtime.block_on(async {
        for _ in 0..iterations {
            let mut target = Service::default();
            store.bind(&mut target).await.unwrap();
        }
    });
    report("Bind (10 keys)", iterations, start.elapsed());

    // Duration syntax
    let inputs = ["300ms", "1h30m", "2.5s", "1h2m3s4ms5us6ns"];
    let iterations = 1_000_000;
    for input in inputs {
        let start = Instant::now();
        for _ in 0..iterations {
            let _ = parse_duration(input);
        }
        report(&format!("parse_duration({:?})", input), iterations, start.elapsed());
    }
}

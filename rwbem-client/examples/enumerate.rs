//! Enumerate instances of a class from a live WBEM server.
//!
//! ```sh
//! RWBEM_URL=https://server:5989 RWBEM_USER=admin RWBEM_PASSWORD=pw \
//!     cargo run --example enumerate -- CIM_ComputerSystem
//! ```

use rwbem_client::{ConnectionConfig, InstanceOptions, WbemConnection};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .init();

    let class_name = std::env::args()
        .nth(1)
        .unwrap_or_else(|| "CIM_ComputerSystem".to_string());

    let mut config = ConnectionConfig::new("http://localhost:5988");
    config.apply_env_overrides();
    let conn = WbemConnection::new(config)?;

    let mut count = 0usize;
    for instance in conn.iter_enumerate_instances(&class_name, None, &InstanceOptions::default())? {
        let instance = instance?;
        match &instance.path {
            Some(path) => println!("{path}"),
            None => println!("<instance of {} without path>", instance.class_name),
        }
        count += 1;
    }
    println!("{count} instances of {class_name}");
    Ok(())
}

use dhcp_discover::{
    logging,
    network::{self, InterfaceInfo},
    Args, DiscoverError, DiscoveryClient, DiscoveryConfig,
};
use std::process::ExitCode;

fn show_interfaces(interfaces: &[InterfaceInfo]) {
    if interfaces.is_empty() {
        println!("No active network interfaces found");
        return;
    }

    println!("Available network interfaces:");
    for (i, iface) in interfaces.iter().enumerate() {
        println!("  {}) {}", i + 1, iface.name);
        for addr in &iface.addrs {
            println!("      {}", addr);
        }
    }
}

async fn discover(args: &Args) -> Result<(), DiscoverError> {
    let interfaces = network::active_interfaces();

    if args.show_interfaces {
        show_interfaces(&interfaces);
        return Ok(());
    }

    let iface = network::select_interface(&interfaces, &args.selection())?;
    println!("Using interface: {}", iface);
    tracing::info!("Selected interface: {}", iface);

    let config = DiscoveryConfig::new(iface.name.clone(), iface.mac.clone())
        .with_timeout(args.timeout)
        .with_retries(args.retry);
    let report = DiscoveryClient::new(config).run().await;

    if report.servers.is_empty() {
        println!("no DHCP servers found");
    } else {
        println!("DHCP servers:");
        for server in report.servers.sorted() {
            println!("  {}", server);
        }
    }
    Ok(())
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    let args = Args::parse_with_legacy_flags(std::env::args_os());
    logging::init(args.verbose);

    tracing::info!("=== Start DHCP Discover ===");
    let result = discover(&args).await;
    tracing::info!("=== End DHCP Discover ===");

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!("{}", e);
            eprintln!("error: {}", e);
            ExitCode::FAILURE
        }
    }
}

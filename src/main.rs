use anyhow::Context;
use bustracker::{BusTracker, ClientConfig};
use std::env;
use std::io::{self, BufRead, Write};
use tracing::info;

fn prompt(label: &str) -> anyhow::Result<String> {
    print!("{}", label);
    io::stdout().flush()?;
    let mut line = String::new();
    io::stdin().lock().read_line(&mut line)?;
    Ok(line.trim().to_string())
}

fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    // Init logging
    let log_level = env::var("LOG_LEVEL").unwrap_or_else(|_| "warn".to_string());
    tracing_subscriber::fmt().with_env_filter(log_level).init();

    // Load config, asking for whatever the environment does not provide
    let config = match ClientConfig::from_env() {
        Ok(config) => config,
        Err(_) => ClientConfig::from_env_with_api_key(prompt("Enter your API Key: ")?),
    };
    let route = match env::var("BUSTRACKER_ROUTE") {
        Ok(route) => route,
        Err(_) => prompt("Enter a route id (e.g. 60): ")?,
    };

    let client = BusTracker::with_config(config)?;
    info!("Querying BusTracker for route {}", route);

    println!("CTA system time is {}.", client.get_time()?);

    let routes = client.get_routes()?;
    println!("Found {} routes.", routes.len());

    let directions = client.get_route_directions(&route)?;
    println!("Route {} runs in {} directions.", route, directions.len());

    let vehicles = client.get_route_vehicles(&route)?;
    println!("Route {} has {} active vehicles.", route, vehicles.len());
    if let Some(vehicle) = vehicles.values().next() {
        println!("{}", serde_json::to_string_pretty(vehicle)?);
    }

    let direction = directions
        .first()
        .with_context(|| format!("route {} has no directions", route))?;
    let stops = client.get_route_stops(&route, direction.as_str())?;
    println!(
        "Route {} has {} active stops in the {} direction.",
        route,
        stops.len(),
        direction
    );

    let bulletins = client.get_route_service_bulletins(&route, None)?;
    if bulletins.is_empty() {
        println!("Route {} has no service bulletins.", route);
    } else {
        println!("Route {} has {} service bulletins.", route, bulletins.len());
    }

    let patterns = client.get_route_patterns(&route)?;
    println!("Route {} includes {} patterns.", route, patterns.len());

    if let Some(stop_id) = stops.keys().next() {
        let predictions = client.get_stop_route_predictions([stop_id], [&route])?;
        println!(
            "Stop {} has {} ETD/ETA predictions on route {}.",
            stop_id,
            predictions.len(),
            route
        );
    }

    Ok(())
}

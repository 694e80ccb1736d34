use anyhow::Result;
use farescope_core::reference::{available_routes, AIRPORTS};

pub async fn run() -> Result<()> {
    println!("Airports:");
    for (code, name) in AIRPORTS {
        println!("  {}  {}", code, name);
    }

    println!("\nRoutes:");
    for route in available_routes() {
        match route.distance_km {
            Some(km) => println!("  {:<8} {:>5} km", route.route, km),
            None => println!("  {:<8}     -", route.route),
        }
    }
    Ok(())
}

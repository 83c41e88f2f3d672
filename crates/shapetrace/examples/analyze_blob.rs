use shapetrace::{PixelCoord, Region};
use std::error::Error;

fn main() -> Result<(), Box<dyn Error>> {
    // Filled ellipse with semi-axes 14 and 6.
    let mut pixels = Vec::new();
    for y in -8..=8 {
        for x in -16..=16 {
            let fx = f64::from(x) / 14.0;
            let fy = f64::from(y) / 6.0;
            if fx * fx + fy * fy <= 1.0 {
                pixels.push(PixelCoord::new(x, y));
            }
        }
    }

    let region = Region::from_pixels(&pixels)?;
    let record = region.descriptors();
    println!(
        "area {}, perimeter {:.2}, elongation {:.2}, eccentricity {}",
        record.area,
        record.perimeter,
        record.elongation,
        record.eccentricity.map_or("undefined".to_string(), |e| format!("{e:.2}")),
    );

    if let Some(out_path) = std::env::args().nth(1) {
        let json = serde_json::to_string_pretty(record)?;
        std::fs::write(&out_path, json)?;
        println!("Wrote {out_path}");
    }
    Ok(())
}

//! Markgeom debug driver: runs cut, offset and fillet on sample outlines and
//! prints the resulting contours.
//!
//! Usage:
//! ```text
//! cargo run --example debug                 # all scenarios
//! cargo run --example debug -- offset       # one scenario
//! RUST_LOG=markgeom=trace cargo run --example debug -- offset
//! ```

use markgeom::geometry::Trajectory;
use markgeom::math::Point2;
use markgeom::operations::set_corner_radius;
use markgeom::{Contour, ContourCut, ContourGroup, ContourOffset, Result, Side};

fn main() -> Result<()> {
    // Default: WARN for everything, DEBUG for markgeom.
    // Override with RUST_LOG env var (e.g. RUST_LOG=markgeom=trace).
    let env_filter = tracing_subscriber::EnvFilter::from_default_env()
        .add_directive(tracing_subscriber::filter::LevelFilter::WARN.into())
        .add_directive("markgeom=debug".parse().unwrap_or_default());
    tracing_subscriber::fmt().with_env_filter(env_filter).init();

    let scenario = std::env::args().nth(1);
    let run = |name: &str| scenario.as_deref().map_or(true, |s| s == name);

    if run("cut") {
        let line = Trajectory::straight(Point2::new(-5.0, 4.0), Point2::new(15.0, 4.0));
        for side in [Side::Left, Side::Right] {
            let group = ContourCut::new(u_shape(), line.clone(), side).execute()?;
            print_group(&format!("cut u-shape {side:?}"), &group);
        }
    }

    if run("offset") {
        let group = ContourOffset::new(hourglass(), 1.0, 1.0).execute()?;
        print_group("offset hourglass by 1", &group);
    }

    if run("fillet") {
        let mut square = polygon(&[(0.0, 0.0), (10.0, 0.0), (10.0, 10.0), (0.0, 10.0)]);
        let rounded = set_corner_radius(&mut square, 2.0, 2.0)?;
        println!("fillet square: {rounded} corners rounded");
        print_contour(&square);
    }

    Ok(())
}

fn polygon(points: &[(f64, f64)]) -> Contour {
    let points: Vec<Point2> = points.iter().map(|&(x, y)| Point2::new(x, y)).collect();
    Contour::from_points(&points)
}

fn u_shape() -> Contour {
    polygon(&[
        (0.0, 0.0),
        (10.0, 0.0),
        (10.0, 10.0),
        (7.0, 10.0),
        (7.0, 3.0),
        (3.0, 3.0),
        (3.0, 10.0),
        (0.0, 10.0),
    ])
}

fn hourglass() -> Contour {
    polygon(&[
        (0.0, 0.0),
        (10.0, 0.0),
        (6.0, 5.0),
        (10.0, 10.0),
        (0.0, 10.0),
        (4.0, 5.0),
    ])
}

fn print_group(title: &str, group: &ContourGroup) {
    println!("{title}: {} contour(s)", group.len());
    for contour in group {
        print_contour(contour);
    }
}

fn print_contour(contour: &Contour) {
    println!(
        "  {} edges, length {:.3}, {:?}",
        contour.len(),
        contour.length(),
        contour.direction()
    );
    for edge in contour {
        let t = edge.trajectory();
        let kind = if t.is_straight() { "line" } else { "curve" };
        let (a, b) = (t.start_position(), t.end_position());
        println!(
            "    {kind:5} ({:.3}, {:.3}) -> ({:.3}, {:.3})",
            a.x, a.y, b.x, b.y
        );
    }
}

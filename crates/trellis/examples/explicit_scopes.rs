//! Example: Building a diagram with explicit open/close calls
//!
//! Guards close scopes automatically; this example drives the scope stack by
//! hand instead and writes the DOT description to the system temp directory,
//! so Graphviz does not need to be installed.

use std::env;

use trellis::{
    CloseOutcome, DiagramSettings, EdgeAttrs, Session,
    style::{Direction, LineStyle, OutputFormat},
};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let mut session = Session::default().with_output_dir(env::temp_dir());

    session.open_diagram(
        DiagramSettings::new("Queue Workers", Direction::TopBottom, "queue_workers")
            .with_format(OutputFormat::Dot),
    )?;

    let queue = session.create_node("jobs", "aws.integration.SQS")?;

    let pool = session.open_cluster("Worker Pool")?;
    let workers = vec![
        session.create_node("worker 1", "aws.compute.EC2")?,
        session.create_node("worker 2", "aws.compute.EC2")?,
        session.create_node("worker 3", "aws.compute.EC2")?,
    ];
    session.close_cluster(pool)?;

    let store = session.create_node("results", "aws.storage.S3")?;

    let edges = session.connect(queue, &workers, &EdgeAttrs::new().with_label("poll"))?;
    let edges = edges
        + session.connect(
            &workers,
            store,
            &EdgeAttrs::new()
                .with_color("darkgreen")
                .with_style(LineStyle::Dashed),
        )?;
    println!("connected {edges} edges");

    match session.close()? {
        CloseOutcome::Rendered(rendered) => {
            println!("{}", rendered.description());
            println!("wrote {}", rendered.path().display());
        }
        CloseOutcome::Cluster(id) => println!("closed cluster {}", id.index()),
    }

    Ok(())
}

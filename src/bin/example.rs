//! Section Solver Example - pipe, rectangle and channel sections

use anyhow::Context;
use section_solver::prelude::*;

fn report(name: &str, analysis: &SectionAnalysis) {
    let p = &analysis.properties;
    println!("--- {} ({}) ---", name, analysis.element_type);
    println!("  Area:            {:.6e} m²", p.area);
    println!("  Iy / Iz / Iyz:   {:.6e} / {:.6e} / {:.6e} m⁴", p.iy, p.iz, p.iyz);
    println!("  Centroid (y,z):  ({:.6e}, {:.6e}) m", p.y_centroid, p.z_centroid);
    println!("  Shear ctr (y,z): ({:.6e}, {:.6e}) m", p.y_shear, p.z_shear);
    println!(
        "  Shear corr. y/z: {:.4} / {:.4} (coupling {:.3e})",
        p.shear_correction_y, p.shear_correction_z, p.shear_coupling_yz
    );
    if let Some(j) = p.torsion_constant {
        println!("  Torsion const.:  {:.6e} m⁴", j);
    }
    for warning in &analysis.warnings {
        println!("  WARNING: {:?}", warning);
    }
    println!();
}

fn main() -> anyhow::Result<()> {
    env_logger::init();
    println!("=== Section Solver Example ===\n");

    let options = EngineOptions::default();
    let nu = 0.3;

    // Steel pipe, 168.3 x 7.11 mm
    let pipe = CrossSectionGeometry::pipe(0.1683, 0.00711);
    let analysis = update_properties(&pipe, nu, ElementType::Pipe1, &options)
        .context("pipe section failed")?;
    report("Pipe 168.3 x 7.11", &analysis);

    let closed_form = SectionRequest::new(pipe, nu, ElementType::Pipe1)
        .with_strategy(Strategy::ThinWall)
        .evaluate()
        .context("closed-form pipe failed")?;
    println!(
        "  Closed-form shear correction for comparison: {:.4}\n",
        closed_form.properties.shear_correction_y
    );

    // Solid rectangle 200 x 100 mm
    let rect = CrossSectionGeometry::rectangular(0.2, 0.1);
    let analysis = update_properties(&rect, nu, ElementType::Beam1, &options)
        .context("rectangular section failed")?;
    report("Rectangle 200 x 100", &analysis);

    // Channel; shear centre lies behind the web
    let channel = CrossSectionGeometry::CProfile {
        height: 0.2,
        w1: 0.075,
        t1: 0.0115,
        w2: 0.075,
        t2: 0.0115,
        tw: 0.0085,
        offset_y: 0.0,
        offset_z: 0.0,
    };
    let analysis = update_properties(&channel, nu, ElementType::Beam1, &options)
        .context("channel section failed")?;
    report("Channel 200", &analysis);

    println!("=== Analysis Complete ===");
    Ok(())
}

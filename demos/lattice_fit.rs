//! Lattice fitting with a toy forward model, persisted to a journal file.
//!
//! The "measured" pattern is simulated from a known cell, then the study
//! searches the lattice space for it. A second call resumes the same study
//! from the journal and adds more trials.
//!
//! Run with: `RUST_LOG=latfit=info cargo run --example lattice_fit --features tracing`

use std::fmt::Write as _;

use latfit::crystal::{
    CU_K_ALPHA, Curve, ForwardModel, LatticeParameters, Structure, TwoThetaGrid,
    bragg_two_theta, fit_lattice, lattice_search_space,
};
use latfit::prelude::*;

const CIF: &str = "data_demo
loop_
_atom_site_label
_atom_site_type_symbol
_atom_site_fract_x
_atom_site_fract_y
_atom_site_fract_z
_atom_site_occupancy
Zn1 Zn 0.0000 0.0000 0.0000 1
N1 N 0.1250 0.2500 0.5000 1
";

/// Unit-height Gaussian peaks at the Bragg angles of reflections up to index 2.
struct BraggPeaks {
    grid: TwoThetaGrid,
    width: f64,
}

impl ForwardModel for BraggPeaks {
    type Error = latfit::Error;

    fn simulate(
        &self,
        lattice: &LatticeParameters,
        structure: &Structure,
    ) -> latfit::Result<Curve> {
        let mut intensity = vec![0.0; self.grid.len()];
        let scale = structure.len() as f64;
        for h in 0..=2 {
            for k in -2..=2 {
                for l in -2..=2 {
                    if (h, k, l) == (0, 0, 0) {
                        continue;
                    }
                    let Some(center) = bragg_two_theta(lattice.d_spacing(h, k, l)?, CU_K_ALPHA)
                    else {
                        continue;
                    };
                    for (slot, angle) in intensity.iter_mut().zip(self.grid.angles()) {
                        let z = (angle - center) / self.width;
                        *slot += scale * (-0.5 * z * z).exp();
                    }
                }
            }
        }
        Ok(Curve::new(intensity))
    }
}

fn model() -> BraggPeaks {
    BraggPeaks {
        grid: TwoThetaGrid::default(),
        width: 0.15,
    }
}

fn main() -> latfit::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let dir = std::env::temp_dir();
    let cif_path = dir.join("latfit_demo.cif");
    let csv_path = dir.join("latfit_demo.csv");
    let journal = dir.join("latfit_demo.jsonl");

    // Clean up from any previous run
    let _ = std::fs::remove_file(&journal);

    let truth = LatticeParameters {
        a: 21.5,
        b: 23.0,
        c: 4.2,
        alpha: 92.0,
        beta: 88.0,
        gamma: 105.0,
    };
    let structure = Structure::from_cif_str(CIF, &cif_path)?;
    let measured = model().simulate(&truth, &structure)?;

    let mut csv = String::from("2theta,yobs,ycalc,bkg\n");
    for (angle, y) in model().grid.angles().zip(measured.values()) {
        let _ = writeln!(csv, "{angle:.2},{},0,1.0", y + 1.0);
    }
    let io = |source: std::io::Error, path: &std::path::Path| latfit::Error::Io {
        path: path.to_path_buf(),
        source,
    };
    std::fs::write(&cif_path, CIF).map_err(|e| io(e, &cif_path))?;
    std::fs::write(&csv_path, csv).map_err(|e| io(e, &csv_path))?;

    let location = format!("journal://{}", journal.display());
    for round in 1..=2 {
        let best = fit_lattice("demo", &location, 40, &cif_path, &csv_path, model())?;
        println!(
            "Round {round}: best score {:.4} (trial #{})",
            best.value.unwrap_or(f64::NAN),
            best.id
        );
    }

    // Reopen the stored study to print its summary
    let study = Study::open_or_create(
        "demo",
        Direction::Maximize,
        lattice_search_space()?,
        latfit::storage::open(&location)?,
    )?;
    println!("{}", study.summary());
    println!("True cell: {:?}", truth.to_params());

    let _ = std::fs::remove_file(&cif_path);
    let _ = std::fs::remove_file(&csv_path);
    let _ = std::fs::remove_file(&journal);

    Ok(())
}

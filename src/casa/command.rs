//! CASA task calls as data.
//!
//! Commands are built with typed fields and only turned into Python text by
//! `Command::render`. Values computed inside CASA at run time (the clean
//! threshold) are referenced through `Threshold::Runtime`.

use std::fmt::Write as _;

/// Directory (relative to the target) holding values saved between runs.
pub const TEXT_DIR: &str = "text";
pub const THRESHOLD_FILE: &str = "text/threshold.txt";
pub const STDEV_FILE: &str = "text/stdev.txt";
pub const BEAM_AREA_FILE: &str = "text/beamarea.txt";

/// Normal-distribution scale factor from MAD to standard deviation.
pub const MAD_TO_SIGMA: f64 = 1.4826;

/// Clean threshold passed to `tclean`/`widebandpbcor`.
#[derive(Debug, Clone, PartialEq)]
pub enum Threshold {
    /// A literal quantity such as `0.0Jy`.
    Literal(String),
    /// The `threshold` variable loaded by `Command::LoadThreshold` (in Jy).
    Runtime,
}

impl Threshold {
    fn render(&self) -> String {
        match self {
            Threshold::Literal(q) => py_str(q),
            Threshold::Runtime => "'%sJy' %(threshold)".to_string(),
        }
    }
}

/// A `tclean` call: wide-field (w-projection) multi-term multi-scale imaging
/// with Briggs weighting and auto-multithresh masking.
#[derive(Debug, Clone, PartialEq)]
pub struct Tclean {
    pub vis: Vec<String>,
    pub imagename: String,
    pub imsize: u32,
    pub cell: String,
    pub wprojplanes: u32,
    pub robust: f64,
    pub scales: Vec<u32>,
    pub niter: u32,
    pub threshold: Threshold,
    /// Only set for the deep clean; the dirty pass keeps CASA's default.
    pub sidelobe_threshold: Option<f64>,
    /// Compute PSF and residual (dirty pass) or reuse them (clean pass).
    pub calc_psf_and_residual: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    Tclean(Tclean),
    /// Measure the image MAD and save `sigma·1.4826·MAD` as the clean threshold.
    MadThreshold { image: String, sigma: f64 },
    /// Read the saved threshold into the `threshold` variable.
    LoadThreshold,
    WidebandPbcor {
        vis: String,
        imagename: String,
        threshold: Threshold,
    },
    /// Square region `[lo, hi]` pixels on both axes.
    ImSubImage {
        image: String,
        outfile: String,
        frame: (u32, u32),
    },
    ExportFits { image: String, fits: String },
    /// Save the MAD-based noise and the restoring beam area (in beam-axis units²).
    NoiseAndBeam { image: String },
}

impl Command {
    /// Python source for this command, ending in a blank line.
    pub fn render(&self) -> String {
        let mut out = String::new();
        match self {
            Command::Tclean(t) => {
                let _ = write!(
                    out,
                    "tclean(vis={vis}, imagename={name}, field='0', datacolumn='data', verbose=True, \
                     gridder='wproject', wprojplanes={wproj}, pblimit=-1, robust={robust}, imsize=[{imsize}], \
                     cell={cell}, specmode='mfs', deconvolver='mtmfs', nterms=2, scales={scales}, \
                     interactive=False, niter={niter}, weighting='briggs', usemask='auto-multithresh', ",
                    vis = py_list(&t.vis),
                    name = py_str(&t.imagename),
                    wproj = t.wprojplanes,
                    robust = py_float(t.robust),
                    imsize = t.imsize,
                    cell = py_str(&t.cell),
                    scales = py_int_list(&t.scales),
                    niter = t.niter,
                );
                if let Some(s) = t.sidelobe_threshold {
                    let _ = write!(out, "sidelobethreshold={}, ", py_float(s));
                }
                let calc = if t.calc_psf_and_residual { "True" } else { "False" };
                let _ = writeln!(
                    out,
                    "stokes='I', threshold={}, calcpsf={calc}, calcres={calc}, savemodel='modelcolumn', restart=True)",
                    t.threshold.render()
                );
            }
            Command::MadThreshold { image, sigma } => {
                let _ = writeln!(out, "stats=imstat({})", py_str(image));
                let _ = writeln!(out, "thresh={}*{MAD_TO_SIGMA}*stats['medabsdevmed'][0]", py_float(*sigma));
                out.push_str("print(thresh)\n");
                let _ = writeln!(out, "with open('{THRESHOLD_FILE}', 'w') as f:");
                out.push_str("\tf.write('%s' %(thresh))\n");
            }
            Command::LoadThreshold => {
                let _ = writeln!(out, "with open('{THRESHOLD_FILE}', 'r') as f:");
                out.push_str("\tglobal threshold\n");
                out.push_str("\tlines=f.readlines()\n");
                out.push_str("\tthreshold=float(lines[0])\n");
                out.push_str("print(threshold)\n");
            }
            Command::WidebandPbcor {
                vis,
                imagename,
                threshold,
            } => {
                let _ = writeln!(
                    out,
                    "widebandpbcor(vis={}, imagename={}, nterms=2, threshold={}, action='pbcor', field='0', \
                     spwlist=[0,7,15], chanlist=[0,0,0], weightlist=[1,1,1])",
                    py_str(vis),
                    py_str(imagename),
                    threshold.render()
                );
            }
            Command::ImSubImage { image, outfile, frame } => {
                let (lo, hi) = *frame;
                let _ = writeln!(
                    out,
                    "imsubimage(imagename={}, outfile={}, overwrite=True, region='box[[{lo}pix, {lo}pix], [{hi}pix, {hi}pix]]')",
                    py_str(image),
                    py_str(outfile)
                );
            }
            Command::ExportFits { image, fits } => {
                let _ = writeln!(
                    out,
                    "exportfits(imagename={}, fitsimage={}, overwrite=True)",
                    py_str(image),
                    py_str(fits)
                );
            }
            Command::NoiseAndBeam { image } => {
                let image = py_str(image);
                out.push_str("import numpy as np\n");
                let _ = writeln!(out, "stats=imstat({image})");
                let _ = writeln!(out, "stdev={MAD_TO_SIGMA}*stats['medabsdevmed'][0]");
                let _ = writeln!(out, "with open('{STDEV_FILE}', 'w') as f:");
                out.push_str("\tf.write('%s' %(stdev))\n");
                let _ = writeln!(out, "majoraxis = imhead(imagename={image}, mode='get', hdkey='bmaj')['value']");
                let _ = writeln!(out, "minoraxis = imhead(imagename={image}, mode='get', hdkey='bmin')['value']");
                out.push_str("beamarea = np.pi*majoraxis*minoraxis/(4*np.log(2))\n");
                let _ = writeln!(out, "with open('{BEAM_AREA_FILE}', 'w') as f:");
                out.push_str("\tf.write('%s' %(beamarea))\n");
            }
        }
        out.push('\n');
        out
    }
}

/// Single-quoted Python string literal.
fn py_str(s: &str) -> String {
    format!("'{}'", s.replace('\\', "\\\\").replace('\'', "\\'"))
}

fn py_list(items: &[String]) -> String {
    let inner: Vec<String> = items.iter().map(|s| py_str(s)).collect();
    format!("[{}]", inner.join(", "))
}

fn py_int_list(items: &[u32]) -> String {
    let inner: Vec<String> = items.iter().map(u32::to_string).collect();
    format!("[{}]", inner.join(","))
}

/// Python float literal (`3.0`, not `3`).
fn py_float(v: f64) -> String {
    format!("{v:?}")
}

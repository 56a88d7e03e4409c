use log::{debug, error, LevelFilter};
use structopt::StructOpt;

use impresso_lid::cli::ImpressoLid;
use impresso_lid::error::Error;
use impresso_lid::identifiers::{BankConfig, ClassifierBank};
use impresso_lid::scheduling;
use impresso_lid::stages::{bundle_stats, AggregateStage, AnnotateStage, DecideStage};

fn main() {
    // set default log level to info
    let mut builder = env_logger::Builder::new();
    builder.filter_level(LevelFilter::Info);
    builder.parse_env("RUST_LOG");
    builder.init();

    let opt = ImpressoLid::from_args();
    debug!("cli args\n{:#?}", opt);

    if let Err(e) = run(opt) {
        error!("{e}");
        std::process::exit(e.exit_code());
    }
}

fn run(opt: ImpressoLid) -> Result<(), Error> {
    match opt {
        ImpressoLid::Annotate(a) => {
            if let Some(max_load) = a.max_load {
                scheduling::wait_below_load(max_load);
            }
            let bank = ClassifierBank::new(
                &a.effective_lids(),
                &BankConfig {
                    impresso_ft: a.impresso_ft.clone(),
                    wp_ft: a.wp_ft.clone(),
                    minimal_text_length: a.minimal_text_length,
                },
            )?;
            AnnotateStage::new(bank, a.infile, a.outfile, a.round_ndigits, a.git_describe).run()
        }
        ImpressoLid::Aggregate(a) => {
            AggregateStage::new(a.config(), a.input_files.clone(), a.outfile).run()
        }
        ImpressoLid::Decide(d) => {
            if let Some(max_load) = d.max_load {
                scheduling::wait_below_load(max_load);
            }
            DecideStage::new(
                d.config(),
                d.infile,
                d.outfile,
                d.collection_stats_filename,
                d.diagnostics_json,
                d.git_describe,
            )
            .run()
        }
        ImpressoLid::Bundle(b) => bundle_stats(&b.input_files, &b.outfile),
    }
}

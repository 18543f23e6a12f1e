use clap::Parser;


#[derive(Parser)]
#[clap(author, version, about)]
pub struct CliParser {

    /// Base names of the input source files; ".as" is appended to each to
    /// locate its source (§6)
    #[clap(value_parser, required = true)]
    pub input_files: Vec<String>,

    /// Print each unit's pipeline stages as it assembles
    #[clap(short = 'v', long = "verbose", action)]
    pub verbose: bool,

    /// Keep the macro-expanded ".am" file after a successful assembly
    #[clap(short = 'k', long = "keep-intermediates", action)]
    pub keep_intermediates: bool,

}

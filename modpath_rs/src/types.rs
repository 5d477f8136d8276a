use clap::ValueEnum;

pub const DEFAULT_TOP: usize = 10;
pub const MAX_REPORTED_WARNINGS: usize = 50;

#[derive(Clone, Copy, PartialEq, Eq, Debug, Default, ValueEnum)]
pub enum ColorMode {
    #[default]
    Auto,
    Always,
    Never,
}

#[derive(Clone, Copy, PartialEq, Eq, Debug, Default)]
pub enum OutputMode {
    #[default]
    Human,
    Json,
}

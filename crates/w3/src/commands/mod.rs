use w3_formats::Format;

pub mod decode;
pub mod jass;
pub mod map;
pub mod roundtrip;

#[derive(clap::Subcommand)]
pub enum Commands {
    /// Decode a map file and print it as JSON
    Decode(decode::DecodeArgs),
    /// Check that a map file encodes back to the same bytes
    Roundtrip(roundtrip::RoundtripArgs),
    /// Decode every known file of an extracted map
    Map(map::MapArgs),
    /// Handle JASS scripts
    Jass {
        #[command(subcommand)]
        command: jass::JassCommands,
    },
}

impl Commands {
    pub fn handle(&self) -> miette::Result<()> {
        match self {
            Commands::Decode(decode) => decode.handle(),
            Commands::Roundtrip(roundtrip) => roundtrip.handle(),
            Commands::Map(map) => map.handle(),
            Commands::Jass { command } => command.handle(),
        }
    }
}

/// Accepts a format name such as `doodads` or an entry name such as `war3map.doo`
pub(crate) fn parse_format(value: &str) -> Result<Format, String> {
    value.parse().map_err(|e: w3_formats::Error| {
        let known = Format::ALL.iter().map(|f| f.name()).collect::<Vec<_>>();
        format!("{e}; expected one of {}", known.join(", "))
    })
}

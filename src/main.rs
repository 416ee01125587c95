use anyhow::{Context, Result, bail};
use clap::{Parser, Subcommand};
mod auth;
use settings_codec::{CodecError, SettingsCodec, Storage};
use std::path::{Path, PathBuf};

#[derive(Debug, Parser)]
#[command(name = "settings-codec")]
#[command(
    version,
    about = "Encrypts and decrypts password-protected browser settings exports."
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, clap::Args)]
struct Paths {
    /// File to read
    #[arg(short, long, value_name = "PATH", env = "SETTINGS_CODEC_INPUT")]
    input: PathBuf,

    /// File to write
    #[arg(short, long, value_name = "PATH", env = "SETTINGS_CODEC_OUTPUT")]
    output: PathBuf,

    /// Replace the output file if it already exists
    #[arg(short, long, default_value_t = false)]
    force: bool,
}

impl Paths {
    fn check_output(&self) -> Result<()> {
        if !self.force && Storage::new(&self.output).exists() {
            bail!(
                "{} already exists (use --force to overwrite)",
                self.output.display()
            );
        }
        Ok(())
    }
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Encrypts a plaintext settings snapshot
    Export {
        #[command(flatten)]
        paths: Paths,
    },

    /// Decrypts an encrypted settings export
    Import {
        #[command(flatten)]
        paths: Paths,
    },

    /// Shows the layout of an encrypted export without decrypting it
    #[command(arg_required_else_help = true)]
    Inspect {
        file: PathBuf,

        /// Print as JSON
        #[arg(long, default_value_t = false)]
        json: bool,
    },
}

fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    let args = Cli::parse();
    match args.command {
        Commands::Export { paths } => {
            paths.check_output()?;
            let password = auth::read_new_password_with_confirmation()?;
            SettingsCodec::encrypt_file(&paths.input, &paths.output, &password)
                .with_context(|| format!("export of {} failed", paths.input.display()))?;
            println!("settings exported to {}", paths.output.display());
        }
        Commands::Import { paths } => {
            paths.check_output()?;
            let password = auth::read_password()?;
            match SettingsCodec::decrypt_file(&paths.input, &paths.output, &password) {
                Ok(()) => println!("settings imported to {}", paths.output.display()),
                Err(CodecError::Authentication) => {
                    bail!("wrong password or corrupted file; try again with the correct password")
                }
                Err(e) => {
                    return Err(e)
                        .with_context(|| format!("import of {} failed", paths.input.display()));
                }
            }
        }
        Commands::Inspect { file, json } => {
            let info = inspect_file(&file)?;
            if json {
                println!("{}", serde_json::to_string_pretty(&info)?);
            } else {
                println!("{info}");
            }
        }
    }

    Ok(())
}

fn inspect_file(path: &Path) -> Result<settings_codec::BlobInfo> {
    let data = Storage::new(path).load()?;
    Ok(settings_codec::inspect(&data)?)
}

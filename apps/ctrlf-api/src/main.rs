use clap::Parser;

#[tokio::main]
async fn main() -> color_eyre::Result<()> {
	color_eyre::install()?;

	let args = ctrlf_api::Args::parse();

	ctrlf_api::run(args).await
}

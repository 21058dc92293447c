use ctrlf_router::Session;

#[derive(Clone)]
pub struct AppState {
	pub session: Session,
}
impl AppState {
	pub fn new(session: Session) -> Self {
		Self { session }
	}

	pub fn from_config(config: &ctrlf_config::Config) -> color_eyre::Result<Self> {
		Ok(Self::new(Session::from_config(config)?))
	}
}

use anyhow::{bail, Context, Result};
use clap::{Args, Parser, Subcommand};
use log::{error, info, warn};
use poster_studio::export::{export_output, saved_file_name, write_image};
use poster_studio::session::{DEFAULT_INFO_TEXT, DEFAULT_PERSON_NAME};
use poster_studio::{
    compose_generation_prompt, edit, BackgroundTheme, Credentials, Gallery, GeminiClient,
    ImageAsset, JsonFileStorage, LogoPresence, LogoRole, Platform, PosterBrief, Session, SocialLink,
    StudioConfig, StyleConfig, PRESETS,
};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "poster-studio", version, about = "Generate event posters with a hosted image model")]
struct Cli {
    /// Gallery file (overrides POSTER_STUDIO_GALLERY)
    #[arg(long, global = true)]
    gallery: Option<PathBuf>,

    /// Image model name (overrides POSTER_STUDIO_MODEL)
    #[arg(long, global = true)]
    model: Option<String>,

    /// API base URL (overrides POSTER_STUDIO_API_BASE)
    #[arg(long, global = true)]
    api_base: Option<String>,

    /// Watermark name woven into the posters
    #[arg(long, global = true)]
    watermark: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Print the instruction document without calling the model
    Prompt(PosterArgs),
    /// Generate a tall and a square poster
    Generate {
        #[command(flatten)]
        poster: PosterArgs,
        /// Directory the posters are written to
        #[arg(long, default_value = "posters")]
        out: PathBuf,
        /// Number of batches to generate in this session
        #[arg(long, default_value_t = 1)]
        batches: usize,
        /// Also save every generated poster to the gallery
        #[arg(long)]
        save: bool,
    },
    /// Replace the text on an existing poster
    Edit {
        /// Poster image to edit
        #[arg(long)]
        image: PathBuf,
        /// Replacement text
        #[arg(long, conflicts_with = "text_file")]
        text: Option<String>,
        /// Read the replacement text from a file
        #[arg(long)]
        text_file: Option<PathBuf>,
        /// Output file
        #[arg(long, default_value = "edited-poster.png")]
        out: PathBuf,
    },
    /// Manage saved posters
    #[command(subcommand)]
    Gallery(GalleryCommand),
    /// List the style presets
    Presets,
    /// List the background themes
    Themes,
}

#[derive(Subcommand)]
enum GalleryCommand {
    /// Show saved posters
    List,
    /// Save an image file to the gallery
    Save { image: PathBuf },
    /// Delete a saved poster by id
    Delete { id: u64 },
    /// Write every saved poster into a directory
    Export {
        #[arg(default_value = "gallery")]
        dir: PathBuf,
    },
}

#[derive(Args)]
struct PosterArgs {
    /// Presenter photo
    #[arg(long)]
    presenter: Option<PathBuf>,
    /// Logo placed top-left
    #[arg(long)]
    logo: Option<PathBuf>,
    /// Logo placed top-right
    #[arg(long)]
    logo2: Option<PathBuf>,
    /// Presenter name
    #[arg(long, default_value = DEFAULT_PERSON_NAME)]
    name: String,
    /// Event text, used verbatim
    #[arg(long, conflicts_with = "info_file")]
    info: Option<String>,
    /// Read the event text from a file
    #[arg(long)]
    info_file: Option<PathBuf>,
    /// Background theme
    #[arg(long, default_value = "Gold and Black")]
    theme: String,
    /// Style preset
    #[arg(long, default_value = "Energetic")]
    preset: String,
    #[arg(long, allow_hyphen_values = true)]
    sharpening: Option<i32>,
    #[arg(long, allow_hyphen_values = true)]
    brightness: Option<i32>,
    #[arg(long, allow_hyphen_values = true)]
    contrast: Option<i32>,
    #[arg(long)]
    facial_fidelity: Option<i32>,
    #[arg(long)]
    expression: Option<String>,
    /// Do not ask the model to keep the original skin tone
    #[arg(long)]
    no_skin_tone: bool,
    /// Social platform for the QR code (instagram, facebook, vk, email)
    #[arg(long)]
    social_platform: Option<String>,
    /// Handle or address on that platform
    #[arg(long)]
    social_handle: Option<String>,
}

impl PosterArgs {
    fn info_text(&self) -> Result<String> {
        match (&self.info, &self.info_file) {
            (Some(text), _) => Ok(text.clone()),
            (None, Some(path)) => std::fs::read_to_string(path)
                .with_context(|| format!("failed to read {}", path.display())),
            (None, None) => Ok(DEFAULT_INFO_TEXT.to_string()),
        }
    }

    fn style(&self) -> Result<StyleConfig> {
        let mut style = StyleConfig::new();
        style.apply_preset(&self.preset)?;
        style.set_background(self.theme.parse::<BackgroundTheme>()?);
        if let Some(v) = self.sharpening {
            style.set_sharpening(v);
        }
        if let Some(v) = self.brightness {
            style.set_brightness(v);
        }
        if let Some(v) = self.contrast {
            style.set_contrast(v);
        }
        if let Some(v) = self.facial_fidelity {
            style.set_facial_fidelity(v);
        }
        if let Some(v) = &self.expression {
            style.set_expression(v.clone());
        }
        if self.no_skin_tone {
            style.set_preserve_skin_tone(false);
        }
        Ok(style)
    }

    fn social(&self) -> Result<SocialLink> {
        let mut link = SocialLink::default();
        if let Some(p) = &self.social_platform {
            link.set_platform(Some(p.parse::<Platform>()?));
        }
        if let Some(h) = &self.social_handle {
            link.set_handle(h.clone());
        }
        Ok(link)
    }
}

fn load_config(cli: &Cli) -> Result<StudioConfig> {
    let mut config = StudioConfig::from_env()?;
    if let Some(path) = &cli.gallery {
        config.gallery_path = path.clone();
    }
    if let Some(model) = &cli.model {
        config.model = model.clone();
    }
    if let Some(base) = &cli.api_base {
        config.api_base = base.clone();
    }
    if let Some(mark) = &cli.watermark {
        config.branding.watermark = mark.clone();
    }
    Ok(config)
}

fn model_client(config: &StudioConfig) -> Result<GeminiClient> {
    let Some(credentials) = Credentials::from_env() else {
        bail!("no API key found; set GEMINI_API_KEY (or GOOGLE_API_KEY / API_KEY)");
    };
    Ok(GeminiClient::new(config, credentials)?)
}

fn print_prompt(config: &StudioConfig, args: &PosterArgs) -> Result<()> {
    let style = args.style()?;
    let info_text = args.info_text()?;
    let social_link = args.social()?.url();
    let brief = PosterBrief {
        info_text: &info_text,
        person_name: &args.name,
        background: style.background(),
        tuning: style.tuning(),
        logos: LogoPresence {
            first: args.logo.is_some(),
            second: args.logo2.is_some(),
        },
        social_link: &social_link,
    };
    println!("{}", compose_generation_prompt(&brief, &config.branding));
    Ok(())
}

fn run_generate(config: StudioConfig, args: &PosterArgs, out: &PathBuf, batches: usize, save: bool) -> Result<()> {
    let Some(presenter) = &args.presenter else {
        bail!("Please upload a main image of the presenter (--presenter).");
    };
    let model = model_client(&config)?;
    let storage = JsonFileStorage::new(config.gallery_path.clone());
    let brand = config.branding.watermark.clone();

    let mut session = Session::new(config, model, storage);
    session.on_progress(|msg| info!("{}", msg));
    session.assets_mut().set_presenter(ImageAsset::from_path(presenter)?);
    if let Some(path) = &args.logo {
        session.assets_mut().set_logo(LogoRole::First, ImageAsset::from_path(path)?);
    }
    if let Some(path) = &args.logo2 {
        session.assets_mut().set_logo(LogoRole::Second, ImageAsset::from_path(path)?);
    }
    session.set_person_name(args.name.clone());
    session.set_info_text(args.info_text()?);
    *session.style_mut() = args.style()?;
    *session.social_mut() = args.social()?;

    let wanted = batches.max(1);
    let mut failure = None;
    for n in 1..=wanted {
        match session.generate() {
            Ok(batch) if batch.duplicated => {
                warn!("only one image came back; it was used for both the story and square poster");
            }
            Ok(_) => {}
            Err(e) => {
                error!("batch {} of {} failed: {}", n, wanted, e);
                failure = Some(e);
                break;
            }
        }
    }

    // Batches that did come back are still written and saved.
    for (batch_index, batch) in session.batches().iter().enumerate() {
        for output in batch.outputs() {
            let path = export_output(out, &brand, batch_index, output)?;
            println!("{} ({}) -> {}", output.slot, output.slot.aspect_ratio(), path.display());
        }
    }
    if !session.batches().is_empty() {
        println!("note: story/square assignment follows response order and is not verified by the model");
    }

    if save {
        let urls: Vec<String> = session
            .batches()
            .iter()
            .flat_map(|b| b.outputs())
            .map(|o| o.data_url.clone())
            .collect();
        for url in urls {
            match session.save_poster(&url) {
                Some(id) => println!("saved poster {}", id),
                None => println!("poster already in gallery"),
            }
        }
    }
    if session.has_unsaved_outputs() {
        warn!("generated posters were written to {} but not saved to the gallery (use --save)", out.display());
    }
    match failure {
        Some(e) => Err(anyhow::Error::new(e).context("generation stopped early")),
        None => Ok(()),
    }
}

fn run_edit(config: &StudioConfig, image: &PathBuf, text: String, out: &PathBuf) -> Result<()> {
    let model = model_client(config)?;
    let original = ImageAsset::from_path(image)?.to_data_url().to_string();
    let edited = edit::edit_text(&model, &original, &text)?;

    let dir = out.parent().map(PathBuf::from).unwrap_or_default();
    let name = out
        .file_name()
        .and_then(|n| n.to_str())
        .context("output path has no file name")?;
    let path = write_image(&dir, name, &edited)?;
    println!("edited poster -> {}", path.display());
    Ok(())
}

fn run_gallery(config: &StudioConfig, cmd: &GalleryCommand) -> Result<()> {
    let mut gallery = Gallery::open(JsonFileStorage::new(config.gallery_path.clone()));
    match cmd {
        GalleryCommand::List => {
            if gallery.is_empty() {
                println!("gallery is empty");
            }
            for poster in gallery.posters() {
                println!("{}\t{} bytes", poster.id, poster.image_data_url.len());
            }
        }
        GalleryCommand::Save { image } => {
            let url = ImageAsset::from_path(image)?.to_data_url().to_string();
            match gallery.save(&url) {
                Some(id) => println!("saved poster {}", id),
                None => println!("poster already in gallery"),
            }
        }
        GalleryCommand::Delete { id } => {
            if gallery.delete(*id) {
                println!("deleted poster {}", id);
            } else {
                println!("no poster with id {}", id);
            }
        }
        GalleryCommand::Export { dir } => {
            for poster in gallery.posters() {
                let path = write_image(dir, &saved_file_name(poster.id), &poster.image_data_url)?;
                println!("{}", path.display());
            }
        }
    }
    Ok(())
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .format_timestamp_millis()
        .init();

    let cli = Cli::parse();
    let config = load_config(&cli)?;

    match &cli.command {
        Command::Prompt(args) => print_prompt(&config, args),
        Command::Generate { poster, out, batches, save } => {
            run_generate(config, poster, out, *batches, *save)
        }
        Command::Edit { image, text, text_file, out } => {
            let text = match (text, text_file) {
                (Some(t), _) => t.clone(),
                (None, Some(path)) => std::fs::read_to_string(path)
                    .with_context(|| format!("failed to read {}", path.display()))?,
                (None, None) => bail!("provide the replacement text with --text or --text-file"),
            };
            run_edit(&config, image, text, out)
        }
        Command::Gallery(cmd) => run_gallery(&config, cmd),
        Command::Presets => {
            for preset in PRESETS.iter() {
                let t = preset.tuning();
                println!(
                    "{:<11} sharpening {:>3}  brightness {:>3}  contrast {:>3}  fidelity {:>3}  expression {}",
                    preset.name, t.sharpening, t.brightness, t.contrast, t.facial_fidelity, t.expression
                );
            }
            Ok(())
        }
        Command::Themes => {
            for theme in BackgroundTheme::ALL {
                println!("{}", theme);
            }
            Ok(())
        }
    }
}

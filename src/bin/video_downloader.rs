use video_downloader::downloader::VideoDownloader;
use clap::Parser;
use tokio;

/// Crawls a paginated profile feed and downloads every video it
/// references, skipping files already present on disk
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Args {
    /// Base URL of the site hosting the feed
    #[arg(short = 'b', long = "base_url")]
    base_url: String,

    /// Profile whose feed is crawled
    #[arg(short = 'u', long = "user_id")]
    user_id: String,

    /// First page of the feed to visit
    #[arg(short = 's', long = "start_page", default_value_t = 1)]
    start_page: u32,

    /// Last page of the feed to visit (inclusive)
    #[arg(short = 'e', long = "end_page", default_value_t = 5)]
    end_page: u32,

    /// Directory the videos are saved into
    #[arg(short = 'd', long = "download_directory", default_value = "./videos")]
    download_directory: String,

    /// Show the browser window instead of running headless
    #[arg(long = "no_headless")]
    no_headless: bool,
}

#[tokio::main]
async fn main() {

    let args = Args::parse();

    let downloader = VideoDownloader::new(
        args.base_url,
        args.user_id,
        args.start_page,
        args.end_page,
        args.download_directory,
        !args.no_headless,
    ).expect("Can't initiate HTTP client");

    downloader.run().await.expect("Download run failed");

}

use scraper::{Html, Selector};
use serde::Deserialize;
use serde_json::Value;

/// Script tag carrying the server-rendered page state.
pub const DATA_ISLAND_SELECTOR: &str = "script#__NEXT_DATA__";

/// One video reference found in a page's data island.
/// Lives for a single iteration of the page loop.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct VideoItem {
    #[serde(rename = "body")]
    pub caption: String,
    pub media_url: String,
}

/// Extracts the video items embedded in a rendered page.
///
/// The items live at the fixed path `props.pageProps.tweets` inside the
/// data island. A missing island, unparseable JSON, a missing path or an
/// empty array all yield an empty vec; an empty result is indistinguishable
/// from the end of the feed.
pub fn extract_video_items(html: &str) -> Vec<VideoItem> {

    let document = Html::parse_document(html);
    let selector = Selector::parse(DATA_ISLAND_SELECTOR).unwrap();

    let Some(script) = document.select(&selector).next() else {
        return Vec::new();
    };

    let raw = script.text().collect::<String>();
    let Ok(data) = serde_json::from_str::<Value>(&raw) else {
        return Vec::new();
    };

    data.get("props")
        .and_then(|v| v.get("pageProps"))
        .and_then(|v| v.get("tweets"))
        .and_then(Value::as_array)
        .map(|tweets| {
            tweets
                .iter()
                .filter_map(|tweet| serde_json::from_value(tweet.clone()).ok())
                .collect()
        })
        .unwrap_or_default()
}

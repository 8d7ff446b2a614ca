use std::sync::Arc;

use anyhow::{Context, Result};
use rune_config::RuneConfig;
use rune_text::{
    DrawOrigin, Entity, FaceMetrics, FixedMetrics, FontFace, HighlightKey, MetricsProvider,
    SpoilerSpan, TextBuilder,
};

const SAMPLE: &str = "Rune lays out rich text: bold runs, links like example.org, \
                      hidden spoilers and inline icons.\nA second paragraph \
                      with \u{1F600} emoji and \u{05E9}\u{05DC}\u{05D5}\u{05DD} in Hebrew.";

fn main() -> Result<()> {
    let _ = env_logger::try_init();
    let config = RuneConfig::load();
    log::info!("config: {config:?}");

    let provider: Arc<dyn MetricsProvider> = match &config.text.font {
        Some(path) => {
            let face = FontFace::from_path(path, 0)
                .with_context(|| format!("loading font {}", path.display()))?;
            Arc::new(FaceMetrics::new(Arc::new(face), config.text.text_size))
        }
        None => {
            let size = config.text.text_size;
            Arc::new(FixedMetrics::new(size * 0.6).with_vertical(size * 0.8, size * 0.2, 0.0))
        }
    };

    let mut builder = TextBuilder::new(provider)
        .flags(config.text_flags())
        .dimensions(config.dimensions())
        .slow_layout_threshold(config.slow_layout_threshold());
    if let Some(max_lines) = config.text.max_lines {
        builder = builder.max_lines(max_lines);
    }
    let mut text = builder.build().context("building text layout")?;

    let highlight = HighlightKey {
        background: 0xFFFF_F3B0,
        outline: 0,
    };
    let entities = vec![
        Entity::new(25..29).bold(),
        Entity::new(47..58).clickable(1).with_highlight(highlight),
        Entity::new(67..75).with_spoiler(SpoilerSpan::new(67, 8)),
        Entity::icon(87, 16.0, 16.0),
    ];
    text.set(320.0, SAMPLE, entities)
        .context("laying out sample text")?;

    println!(
        "{} lines, {} paragraphs, {}x{}, ellipsized: {}",
        text.line_count(),
        text.paragraph_count(),
        text.width(),
        text.height(),
        text.is_ellipsized()
    );
    for line in 0..text.line_count() {
        println!("  {line:>2}: {:?}", text.line_text(line));
    }
    for (index, part) in text.parts().iter().enumerate() {
        println!(
            "  part {index:>2} line {} x {:>6.1} w {:>6.1} {:?} rtl={} {:?}",
            part.line_index,
            part.x,
            part.width,
            part.kind,
            part.rtl,
            part.text(text.source())
        );
    }

    let origin = DrawOrigin::new(0.0, 0.0);
    for region in text.background_regions(origin) {
        println!("background {:x}: {} rects", region.key.background, region.rects.len());
    }
    for region in text.spoiler_regions(origin) {
        println!("spoiler {:?}: parts {:?}", region.span, region.parts);
    }
    if let Some(rect) = text.part_rect(0, origin) {
        let hit = text.find_part(rect.center(), origin, false);
        println!("hit at {:?} -> {hit:?}", rect.center());
    }
    Ok(())
}

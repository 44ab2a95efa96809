//! Seasonal farming advice.
//!
//! Resolves the current season for the requested hemisphere, renders a
//! fixed five-topic prompt (optionally focused on one crop), and invokes
//! the generation service. This path never touches the vector index.

use chrono::Utc;

use crate::error::PipelineError;
use crate::generation::Generator;
use crate::season::{season_for, Hemisphere, Season};

/// Advice text plus the season it was generated for.
#[derive(Debug, Clone)]
pub struct SeasonalAdvice {
    pub season: Season,
    pub text: String,
}

/// Generate seasonal advice for a location, optionally focused on a crop.
pub async fn seasonal_advice(
    generator: &dyn Generator,
    location: &str,
    crop_type: Option<&str>,
    hemisphere: Hemisphere,
) -> Result<SeasonalAdvice, PipelineError> {
    let season = season_for(Utc::now().date_naive(), hemisphere);
    let prompt = build_prompt(location, crop_type, season);
    let text = generator.generate(&prompt).await?;

    Ok(SeasonalAdvice { season, text })
}

fn build_prompt(location: &str, crop_type: Option<&str>, season: Season) -> String {
    let crop_focus = match crop_type {
        Some(crop) if !crop.trim().is_empty() => {
            format!("Focus specifically on {} cultivation.\n\n", crop.trim())
        }
        _ => String::new(),
    };

    format!(
        "As an agricultural expert, provide practical seasonal farming advice for {location} \
         during {season} season.\n\
         \n\
         {crop_focus}Include:\n\
         1. Key activities farmers should focus on during {season}\n\
         2. Common challenges during this season and how to address them\n\
         3. Resource management advice (water, soil, etc.)\n\
         4. Preparation recommendations for the upcoming season\n\
         5. Sustainable farming practices relevant to this time of year\n\
         \n\
         Format the response with clear headings and bullet points for easy reading."
    )
}

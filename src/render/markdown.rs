use std::sync::OnceLock;

use minijinja::{Environment, context};

use crate::entities::image::ImageRef;
use crate::entities::monograph::Monograph;
use crate::error::PharmographError;
use crate::search::SearchState;

static ENV: OnceLock<Environment<'static>> = OnceLock::new();

/// Shown while a search is still in flight.
pub(crate) const LOADING_BANNER: &str = "Generating Drug Profile...";
/// Shown when a completed search produced neither a monograph nor an error.
pub(crate) const NO_DATA_BANNER: &str = "No data found for the specified drug.";
/// Shown before any search has run.
pub(crate) const INITIAL_PROMPT: &str = "Your AI-powered drug reference guide.";
pub(crate) const DOSE_DISCLAIMER: &str = "This is an AI-generated dose suggestion based on \
     standard parameters. It is not a substitute for professional medical advice. Always \
     consult a qualified healthcare provider for any medical concerns or before making any \
     decisions related to your health or treatment.";

#[derive(serde::Serialize)]
struct BrandRow {
    brand_name: String,
    company: String,
    strengths: String,
}

fn env() -> Result<&'static Environment<'static>, PharmographError> {
    if let Some(env) = ENV.get() {
        return Ok(env);
    }

    let mut env = Environment::new();
    env.add_filter("bullet_list", |items: Vec<String>| -> String {
        if items.is_empty() {
            return "None reported.".to_string();
        }
        items
            .iter()
            .map(|item| format!("- {item}"))
            .collect::<Vec<_>>()
            .join("\n")
    });
    env.add_filter(
        "titled_bullets",
        |items: Vec<String>, title: String| -> String {
            if items.is_empty() {
                return format!("{title}: None reported.");
            }
            let mut out = format!("**{title}**\n");
            for item in &items {
                out.push_str("- ");
                out.push_str(item);
                out.push('\n');
            }
            out.trim_end().to_string()
        },
    );
    env.add_filter(
        "numbered_list",
        |items: Vec<String>, empty_note: String| -> String {
            if items.is_empty() {
                return empty_note;
            }
            items
                .iter()
                .enumerate()
                .map(|(index, item)| format!("{}. {item}", index + 1))
                .collect::<Vec<_>>()
                .join("\n")
        },
    );
    env.add_template(
        "monograph.md.j2",
        include_str!("../../templates/monograph.md.j2"),
    )?;

    let _ = ENV.set(env);
    Ok(ENV
        .get()
        .expect("ENV should be initialized by the time this is reached"))
}

/// Renders a settled search snapshot. Purely a function of the state passed
/// in; rendering never issues requests or consults the session.
pub fn state_markdown(state: &SearchState) -> Result<String, PharmographError> {
    if state.loading {
        return Ok(format!("_{LOADING_BANNER}_\n"));
    }
    if let Some(error) = &state.error {
        return Ok(format!("**Error:** {error}\n"));
    }
    if let Some(monograph) = &state.monograph {
        return monograph_markdown(monograph, state.image.as_ref());
    }
    if state.has_searched {
        return Ok(format!("{NO_DATA_BANNER}\n"));
    }
    Ok(format!("{INITIAL_PROMPT}\n"))
}

pub fn monograph_markdown(
    monograph: &Monograph,
    image: Option<&ImageRef>,
) -> Result<String, PharmographError> {
    let tmpl = env()?.get_template("monograph.md.j2")?;
    let brands: Vec<BrandRow> = monograph
        .common_brands_in_pakistan
        .iter()
        .map(|brand| BrandRow {
            brand_name: brand.brand_name.clone(),
            company: brand.company.clone(),
            strengths: brand.strengths.clone(),
        })
        .collect();
    let body = tmpl.render(context! {
        drug_name => &monograph.drug_name,
        image_uri => image.map(ImageRef::data_uri),
        introduction => &monograph.introduction,
        pharmacological_class => &monograph.drug_class_and_category.pharmacological_class,
        therapeutic_category => &monograph.drug_class_and_category.therapeutic_category,
        mechanism_of_action => &monograph.mechanism_of_action,
        fda_approved => &monograph.therapeutic_uses.fda_approved,
        global_guidelines => &monograph.therapeutic_uses.global_guidelines,
        off_label => &monograph.therapeutic_uses.off_label,
        black_box_warning => &monograph.adverse_drug_reactions.black_box_warning,
        adr_common => &monograph.adverse_drug_reactions.common,
        adr_serious => &monograph.adverse_drug_reactions.serious,
        adr_rare => &monograph.adverse_drug_reactions.rare,
        drug_drug => &monograph.interactions.drug_drug,
        drug_food => &monograph.interactions.drug_food,
        drug_herbal => &monograph.interactions.drug_herbal,
        absorption => &monograph.pharmacokinetics.absorption,
        distribution => &monograph.pharmacokinetics.distribution,
        metabolism => &monograph.pharmacokinetics.metabolism,
        excretion => &monograph.pharmacokinetics.excretion,
        half_life => &monograph.pharmacokinetics.half_life,
        bioavailability => &monograph.pharmacokinetics.bioavailability,
        pathway => &monograph.pharmacodynamics.pathway,
        general_tips => &monograph.counselling_tips.general_tips,
        time_of_administration => &monograph.counselling_tips.time_of_administration,
        vehicle => &monograph.counselling_tips.vehicle,
        with_food => &monograph.counselling_tips.with_food,
        foods_to_avoid => &monograph.counselling_tips.foods_to_avoid,
        adult => &monograph.dosage_information.adult,
        pediatric => &monograph.dosage_information.pediatric,
        adjustments => &monograph.dosage_information.adjustments,
        routes_of_administration => &monograph.routes_of_administration,
        brands => brands,
        clinical_cases => &monograph.clinical_cases,
        references => &monograph.references,
    })?;
    Ok(body)
}

pub fn dose_markdown(drug_name: &str, suggestion: &str) -> String {
    let mut out = String::new();
    out.push_str(&format!(
        "# Individual Dose Calculator: {}\n\n",
        drug_name.trim()
    ));
    out.push_str("**Calculated Dose Suggestion:**\n\n");
    out.push_str(suggestion.trim());
    out.push_str("\n\n");
    out.push_str(&format!("**Disclaimer:** {DOSE_DISCLAIMER}\n"));
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entities::monograph;
    use crate::search::CONTENT_FAILURE_ERROR;

    fn sample_image() -> ImageRef {
        ImageRef::from_base64("aGVsbG8=")
    }

    #[test]
    fn monograph_markdown_orders_sections() {
        let monograph = monograph::sample("Paracetamol");
        let markdown = monograph_markdown(&monograph, None).expect("rendered markdown");

        let sections = [
            "# Paracetamol",
            "## Introduction",
            "## Drug Class & Category",
            "## Mechanism of Action",
            "## Therapeutic Uses / Indications",
            "## Adverse Drug Reactions (ADRs)",
            "## Interactions",
            "## Pharmacokinetics (PK)",
            "## Pharmacodynamics (PD)",
            "## Counselling Tips",
            "## Dosage Information",
            "## Routes of Administration",
            "## Common Brands in Pakistan",
            "## Clinical Cases",
            "## References",
        ];
        let positions: Vec<usize> = sections
            .iter()
            .map(|section| {
                markdown
                    .find(section)
                    .unwrap_or_else(|| panic!("missing section {section}"))
            })
            .collect();
        assert!(
            positions.windows(2).all(|pair| pair[0] < pair[1]),
            "sections out of order in:\n{markdown}"
        );
    }

    #[test]
    fn monograph_markdown_embeds_image_as_data_uri() {
        let monograph = monograph::sample("Paracetamol");
        let image = sample_image();
        let markdown = monograph_markdown(&monograph, Some(&image)).expect("rendered markdown");
        assert!(markdown.contains(
            "![Commercial formulation of Paracetamol](data:image/png;base64,aGVsbG8=)"
        ));
        assert!(!markdown.contains("Image not available"));
    }

    #[test]
    fn monograph_markdown_without_image_shows_placeholder() {
        let monograph = monograph::sample("Paracetamol");
        let markdown = monograph_markdown(&monograph, None).expect("rendered markdown");
        assert!(markdown.contains("_Image not available_"));
        assert!(!markdown.contains("data:image/png"));
    }

    #[test]
    fn monograph_markdown_renders_black_box_warning_when_present() {
        let mut monograph = monograph::sample("Warfarin");
        monograph.adverse_drug_reactions.black_box_warning =
            Some("Risk of severe hepatotoxicity in overdose.".to_string());
        let markdown = monograph_markdown(&monograph, None).expect("rendered markdown");
        assert!(markdown.contains("> **BLACK BOX WARNING**"));
        assert!(markdown.contains("> Risk of severe hepatotoxicity in overdose."));

        let plain = monograph::sample("Paracetamol");
        let markdown = monograph_markdown(&plain, None).expect("rendered markdown");
        assert!(!markdown.contains("BLACK BOX WARNING"));
    }

    #[test]
    fn monograph_markdown_fills_sparse_sections_with_empty_notes() {
        let mut monograph = monograph::sample("Sparsinol");
        monograph.mechanism_of_action.clear();
        monograph.therapeutic_uses.off_label.clear();
        monograph.pharmacodynamics.pathway.clear();
        monograph.common_brands_in_pakistan.clear();
        monograph.clinical_cases.clear();
        monograph.references.clear();

        let markdown = monograph_markdown(&monograph, None).expect("rendered markdown");
        assert!(markdown.contains("No pathway information available."));
        assert!(markdown.contains("Off-label: None reported."));
        assert!(markdown.contains("None reported."));
        assert!(markdown.contains("No clinical cases available."));
        assert!(markdown.contains("No references provided."));
        assert!(!markdown.contains("| Brand Name |"));
    }

    #[test]
    fn monograph_markdown_tabulates_brands() {
        let monograph = monograph::sample("Paracetamol");
        let markdown = monograph_markdown(&monograph, None).expect("rendered markdown");
        assert!(markdown.contains("| Brand Name | Company | Strengths/Forms |"));
        assert!(markdown.contains("| Panadol | GSK |"));
    }

    #[test]
    fn monograph_markdown_numbers_clinical_cases() {
        let monograph = monograph::sample("Paracetamol");
        let markdown = monograph_markdown(&monograph, None).expect("rendered markdown");
        assert!(markdown.contains("**Case 1:**"));
        assert!(markdown.contains("**Solution & Rationale:**"));
    }

    #[test]
    fn monograph_markdown_numbers_references() {
        let monograph = monograph::sample("Paracetamol");
        let markdown = monograph_markdown(&monograph, None).expect("rendered markdown");
        assert!(markdown.contains("1. https://go.drugbank.com/drugs/DB00316"));
        assert!(!markdown.contains("No references provided."));
    }

    #[test]
    fn state_markdown_prefers_error_over_monograph_and_image() {
        let state = SearchState {
            monograph: Some(monograph::sample("Paracetamol")),
            image: Some(sample_image()),
            loading: false,
            error: Some(CONTENT_FAILURE_ERROR.to_string()),
            has_searched: true,
        };
        let markdown = state_markdown(&state).expect("rendered markdown");
        assert!(markdown.contains("**Error:**"));
        assert!(markdown.contains(CONTENT_FAILURE_ERROR));
        assert!(!markdown.contains("## Introduction"));
        assert!(!markdown.contains("data:image/png"));
    }

    #[test]
    fn state_markdown_renders_monograph_with_image() {
        let state = SearchState {
            monograph: Some(monograph::sample("Paracetamol")),
            image: Some(sample_image()),
            loading: false,
            error: None,
            has_searched: true,
        };
        let markdown = state_markdown(&state).expect("rendered markdown");
        assert!(markdown.contains("# Paracetamol"));
        assert!(markdown.contains("data:image/png;base64,aGVsbG8="));
    }

    #[test]
    fn state_markdown_shows_loading_banner_while_in_flight() {
        let state = SearchState {
            loading: true,
            has_searched: true,
            ..SearchState::default()
        };
        let markdown = state_markdown(&state).expect("rendered markdown");
        assert!(markdown.contains(LOADING_BANNER));
    }

    #[test]
    fn state_markdown_distinguishes_no_data_from_initial_prompt() {
        let settled_empty = SearchState {
            has_searched: true,
            ..SearchState::default()
        };
        let markdown = state_markdown(&settled_empty).expect("rendered markdown");
        assert!(markdown.contains(NO_DATA_BANNER));

        let initial = SearchState::default();
        let markdown = state_markdown(&initial).expect("rendered markdown");
        assert!(markdown.contains(INITIAL_PROMPT));
        assert!(!markdown.contains(NO_DATA_BANNER));
    }

    #[test]
    fn dose_markdown_includes_suggestion_and_disclaimer() {
        let markdown = dose_markdown("Paracetamol", "500 mg every 6 hours.\n");
        assert!(markdown.contains("# Individual Dose Calculator: Paracetamol"));
        assert!(markdown.contains("**Calculated Dose Suggestion:**\n\n500 mg every 6 hours."));
        assert!(markdown.contains("**Disclaimer:** This is an AI-generated dose suggestion"));
    }
}

//! Table rendering for pipeline state.

use comfy_table::{presets::UTF8_FULL_CONDENSED, Cell, Color, ContentArrangement, Table};
use ideaforge_pipeline::{CombinedConcept, PipelineStage, Variation};

fn base_table(headers: &[&str]) -> Table {
    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL_CONDENSED)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_header(headers.iter().map(|h| Cell::new(h).fg(Color::Cyan)));
    table
}

pub fn variation_table(variations: &[Variation]) -> Table {
    let mut table = base_table(&["#", "Sel", "Title", "Differentiator", "Market", "Revenue"]);
    for (i, variation) in variations.iter().enumerate() {
        table.add_row(vec![
            Cell::new(i + 1),
            Cell::new(if variation.selected { "*" } else { "" }),
            Cell::new(&variation.title),
            Cell::new(&variation.differentiator),
            Cell::new(&variation.target_market),
            Cell::new(&variation.revenue_model),
        ]);
    }
    table
}

pub fn concept_table(concepts: &[CombinedConcept]) -> Table {
    let mut table = base_table(&["#", "Sel", "Title", "Value proposition", "Built from"]);
    for (i, concept) in concepts.iter().enumerate() {
        table.add_row(vec![
            Cell::new(i + 1),
            Cell::new(if concept.selected { "*" } else { "" }),
            Cell::new(&concept.title),
            Cell::new(&concept.value_proposition),
            Cell::new(concept.source_elements.join(", ")),
        ]);
    }
    table
}

pub fn print_stage_table() {
    let mut table = base_table(&["Stage", "Can move to"]);
    for stage in PipelineStage::ALL {
        let targets: Vec<_> = stage
            .valid_transitions()
            .iter()
            .map(|s| s.as_str())
            .collect();
        table.add_row(vec![
            Cell::new(stage.as_str()),
            Cell::new(targets.join(", ")),
        ]);
    }
    println!("{table}");
}

#[cfg(test)]
mod tests {
    use super::*;
    use ideaforge_pipeline::VariationId;

    #[test]
    fn variation_table_lists_titles_and_selection() {
        let variation = Variation {
            id: VariationId::new(),
            selected: true,
            liked_aspects: String::new(),
            edit: None,
            title: "Premium ponies".to_string(),
            description: String::new(),
            differentiator: "craft".to_string(),
            target_market: "stables".to_string(),
            revenue_model: "direct".to_string(),
        };
        let rendered = variation_table(&[variation]).to_string();
        assert!(rendered.contains("Premium ponies"));
        assert!(rendered.contains('*'));
    }
}

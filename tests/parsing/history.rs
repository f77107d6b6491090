#[cfg(test)]
mod history {
    use taxonkeys::language::{History, Resource};
    use taxonkeys::parsing;

    fn document(content: &str) -> String {
        format!("---\nlevels: [genus, species]\n---\n\n{}", content)
    }

    fn parse(content: &str, previous: Option<&History>) -> Vec<Resource> {
        parsing::parse_file(&document(content), "B3", previous)
            .unwrap_or_else(|failure| panic!("{}", failure))
    }

    /// Identifiers and names of the first resource, in line order.
    fn listing(resources: &[Resource]) -> Vec<(String, String)> {
        resources[0]
            .taxa
            .iter()
            .map(|taxon| (taxon.id().to_string(), taxon.scientific_name().to_string()))
            .collect()
    }

    fn revise(old: &str, new: &str) -> Vec<(String, String)> {
        let history = History::from_resources(document(old), &parse(old, None));
        listing(&parse(new, Some(&history)))
    }

    fn entry(id: &str, name: &str) -> (String, String) {
        (id.to_string(), name.to_string())
    }

    #[test]
    fn reparse_is_stable() {
        let content = "Drymus\n  sylvaticus\n  ryeii\nLygaeus\n  equestris\n";
        let fresh = parse(content, None);

        let history = History::from_resources(document(content), &fresh);
        assert_eq!(history.ids, vec![vec![1, 2, 3, 4, 5]]);

        let again = parse(content, Some(&history));
        assert_eq!(listing(&again), listing(&fresh));
    }

    #[test]
    fn inserted_taxon_numbered_after_previous() {
        let old = "Drymus\n  sylvaticus\n";
        let new = "Drymus\n  brunneus\n  sylvaticus\n";

        let history = History::new(document(old), vec![vec![1, 2]]);
        let resources = parse(new, Some(&history));

        assert_eq!(
            listing(&resources),
            vec![
                entry("B3:1:1", "Drymus"),
                entry("B3:1:3", "Drymus brunneus"),
                entry("B3:1:2", "Drymus sylvaticus"),
            ]
        );
    }

    #[test]
    fn recorded_identifiers_reused() {
        let old = "Drymus\n  sylvaticus\n";
        let new = "Drymus\n  sylvaticus\n  ryeii\n";

        let history = History::new(document(old), vec![vec![7, 12]]);
        let resources = parse(new, Some(&history));

        assert_eq!(
            listing(&resources),
            vec![
                entry("B3:1:7", "Drymus"),
                entry("B3:1:12", "Drymus sylvaticus"),
                entry("B3:1:13", "Drymus ryeii"),
            ]
        );
    }

    #[test]
    fn deleted_taxon_keeps_others() {
        assert_eq!(
            revise(
                "Drymus\n  sylvaticus\n  brunneus\n  ryeii\n",
                "Drymus\n  sylvaticus\n  ryeii\n"
            ),
            vec![
                entry("B3:1:1", "Drymus"),
                entry("B3:1:2", "Drymus sylvaticus"),
                entry("B3:1:4", "Drymus ryeii"),
            ]
        );
    }

    #[test]
    fn edited_line_keeps_identifier() {
        assert_eq!(
            revise(
                "Drymus Fieber, 1860\n  sylvaticus\n",
                "Drymus Fieber, 1861\n  sylvaticus\n"
            ),
            vec![
                entry("B3:1:1", "Drymus Fieber, 1861"),
                entry("B3:1:2", "Drymus sylvaticus"),
            ]
        );
    }

    #[test]
    fn placeholder_replaced_by_taxon() {
        assert_eq!(
            revise("Drymus\n  Drymus sp.\n", "Drymus\n  Drymus sylvaticus\n"),
            vec![
                entry("B3:1:1", "Drymus"),
                entry("B3:1:2", "Drymus sylvaticus"),
            ]
        );

        // the placeholder had no identifier, so the new taxon does not take
        // over one of the existing ones
        assert_eq!(
            revise(
                "Drymus\n  Drymus sp.\n  ryeii\n",
                "Drymus\n  sylvaticus\n  ryeii\n"
            ),
            vec![
                entry("B3:1:1", "Drymus"),
                entry("B3:1:3", "Drymus sylvaticus"),
                entry("B3:1:2", "Drymus ryeii"),
            ]
        );
    }

    #[test]
    fn taxon_replaced_by_placeholder() {
        assert_eq!(
            revise(
                "Drymus\n  sylvaticus\nLygaeus\n  equestris\n",
                "Drymus\n  [indet]\nLygaeus\n  equestris\n"
            ),
            vec![
                entry("B3:1:1", "Drymus"),
                entry("B3:1:3", "Lygaeus"),
                entry("B3:1:4", "Lygaeus equestris"),
            ]
        );
    }

    #[test]
    fn blank_lines_do_not_shift_identifiers() {
        assert_eq!(
            revise(
                "Drymus\n  sylvaticus\nLygaeus\n  equestris\n",
                "Drymus\n  sylvaticus\n\nLygaeus\n  equestris\n"
            ),
            vec![
                entry("B3:1:1", "Drymus"),
                entry("B3:1:2", "Drymus sylvaticus"),
                entry("B3:1:3", "Lygaeus"),
                entry("B3:1:4", "Lygaeus equestris"),
            ]
        );
    }

    #[test]
    fn split_line_mints_new_id() {
        assert_eq!(
            revise(
                "Drymus\n  sylvaticus Fabricius, 1775\nLygaeus\n  equestris\n",
                "Drymus\n  sylvaticus\n  ryeii Douglas, 1865\nLygaeus\n  equestris\n"
            ),
            vec![
                entry("B3:1:1", "Drymus"),
                entry("B3:1:2", "Drymus sylvaticus"),
                entry("B3:1:5", "Drymus ryeii Douglas, 1865"),
                entry("B3:1:3", "Lygaeus"),
                entry("B3:1:4", "Lygaeus equestris"),
            ]
        );
    }

    #[test]
    fn merged_lines_keep_following_ids() {
        // the authorship stood on a line of its own, which was still numbered
        let old = "Drymus\n  sylvaticus\n  Fabricius, 1775\nLygaeus\n  equestris\n";
        let new = "Drymus\n  sylvaticus Fabricius, 1775\nLygaeus\n  equestris\n";

        let history = History::new(document(old), vec![vec![1, 2, 3, 4, 5]]);
        let resources = parse(new, Some(&history));

        assert_eq!(
            listing(&resources),
            vec![
                entry("B3:1:1", "Drymus"),
                entry("B3:1:2", "Drymus sylvaticus Fabricius, 1775"),
                entry("B3:1:4", "Lygaeus"),
                entry("B3:1:5", "Lygaeus equestris"),
            ]
        );
    }

    #[test]
    fn short_history_does_not_repeat_ids() {
        let content = "Drymus\n  sylvaticus\n";

        let history = History::new(document(content), vec![vec![2]]);
        let resources = parse(content, Some(&history));

        assert_eq!(
            listing(&resources),
            vec![
                entry("B3:1:2", "Drymus"),
                entry("B3:1:3", "Drymus sylvaticus"),
            ]
        );
    }

    #[test]
    fn second_resource_uses_its_own_list() {
        let old = format!(
            "{}\n\n===\n\n---\nlevels: [species]\n---\n\nLygaeus equestris\n",
            document("Drymus\n  sylvaticus\n")
        );
        let new = format!(
            "{}\n\n===\n\n---\nlevels: [species]\n---\n\nLygaeus simulans\nLygaeus equestris\n",
            document("Drymus\n  sylvaticus\n")
        );

        let history = History::new(old, vec![vec![1, 2], vec![5]]);
        let resources = parsing::parse_file(&new, "B3", Some(&history)).unwrap();

        let ids: Vec<&str> = resources[1]
            .taxa
            .ids()
            .collect();
        assert_eq!(ids, vec!["B3:2:6", "B3:2:5"]);
    }
}

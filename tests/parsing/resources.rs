#[cfg(test)]
mod resources {
    use taxonkeys::language::{Rank, Resource, TaxonomicStatus};
    use taxonkeys::parsing;

    fn document(levels: &str, content: &str) -> String {
        format!("---\nlevels: {}\n---\n\n{}", levels, content)
    }

    fn parse(levels: &str, content: &str) -> Resource {
        let source = document(levels, content);
        let mut resources = parsing::parse_file(&source, "T1", None)
            .unwrap_or_else(|failure| panic!("{}", failure));
        assert_eq!(resources.len(), 1);
        resources.remove(0)
    }

    fn name<'a>(resource: &'a Resource, id: &str) -> &'a str {
        resource
            .taxa
            .get(id)
            .unwrap_or_else(|| panic!("no taxon {}", id))
            .scientific_name()
    }

    #[test]
    fn authorship_on_every_rank() {
        let resource = parse(
            "[family, genus, species]",
            r#"
    Dolichurus haemorrhous A. Costa, 1886
  Dolichurus A. Costa, 1886
    Dolichurus indet.
Sphecidae A. Costa, 1886
    Sphecidae indet.
            "#
            .trim_start_matches('\n'),
        );

        assert_eq!(resource.taxa.len(), 3);
        for taxon in &resource.taxa {
            assert_eq!(taxon.authorship.as_deref(), Some("A. Costa, 1886"));
        }
    }

    #[test]
    fn synonym_with_correction() {
        let resource = parse(
            "[species]",
            "Clytochrysus lapidarius (Panzer, 1804)\n  = Crabo chrysostomus Lepeletier & Brullé, 1835\n    > Crabro chrysostomus Lepeletier & Brullé, 1835\n",
        );

        assert_eq!(resource.taxa.len(), 2);
        assert_eq!(name(&resource, "T1:1:1"), "Clytochrysus lapidarius (Panzer, 1804)");
        assert_eq!(
            name(&resource, "T1:1:2"),
            "Crabro chrysostomus Lepeletier & Brullé, 1835"
        );

        let synonym = resource
            .taxa
            .get("T1:1:2")
            .unwrap();
        assert_eq!(synonym.status, TaxonomicStatus::Synonym);
        assert_eq!(synonym.accepted_id.as_deref(), Some("T1:1:1"));
        assert_eq!(
            synonym
                .incorrect
                .as_ref()
                .and_then(|taxon| taxon
                    .scientific_name
                    .as_deref()),
            Some("Crabo chrysostomus Lepeletier & Brullé, 1835")
        );
    }

    #[test]
    fn synonym_with_rank_abbreviation() {
        let resource = parse(
            "[species]",
            "Lygaeus equestris (Linnaeus, 1758)\n  = f. lactans Horváth, 1899\n",
        );

        assert_eq!(
            name(&resource, "T1:1:2"),
            "Lygaeus equestris f. lactans Horváth, 1899"
        );
        assert_eq!(
            resource
                .taxa
                .get("T1:1:2")
                .unwrap()
                .rank(),
            Rank::Form
        );
    }

    #[test]
    fn accepted_with_rank_abbreviation() {
        let resource = parse(
            "[species, form]",
            "Lygaeus equestris (Linnaeus, 1758)\n  f. lactans Horváth, 1899\n",
        );

        assert_eq!(
            name(&resource, "T1:1:2"),
            "Lygaeus equestris f. lactans Horváth, 1899"
        );
        let form = resource
            .taxa
            .get("T1:1:2")
            .unwrap();
        assert_eq!(form.parent_id.as_deref(), Some("T1:1:1"));
    }

    #[test]
    fn unknown_species_placeholder() {
        let resource = parse("[genus, species]", "Drymus\n  Unknown sp.\n");

        assert_eq!(resource.taxa.len(), 1);
        assert_eq!(name(&resource, "T1:1:1"), "Drymus");
    }

    #[test]
    fn non_ascii_epithets() {
        let resource = parse("[species]", "Nematus fåhraei Thomson\n");

        assert_eq!(name(&resource, "T1:1:1"), "Nematus fåhraei Thomson");
    }

    #[test]
    fn synonyms_in_other_genera_after_correction() {
        let resource = parse(
            "[species]",
            "Katamenes arbustorum subsp. burlinii\n  > arbustorum subsp. burlinii\n  = Eumenes arbustorum var. burlinii\n",
        );

        assert_eq!(resource.taxa.len(), 2);
        assert_eq!(name(&resource, "T1:1:1"), "Katamenes arbustorum subsp. burlinii");
        assert_eq!(name(&resource, "T1:1:2"), "Eumenes arbustorum var. burlinii");
    }

    #[test]
    fn genus_inherited_through_subgenus() {
        let resource = parse(
            "[genus, subgenus, species]",
            "Microdynerus Thomson, 1874\n  Alastorynerus Blüthgen, 1938\n    microdynerus (Dalla Torre, 1889)\n",
        );

        assert_eq!(
            name(&resource, "T1:1:3"),
            "Microdynerus microdynerus (Dalla Torre, 1889)"
        );
        let species = resource
            .taxa
            .get("T1:1:3")
            .unwrap();
        assert_eq!(species.classification.get(Rank::Genus), Some("Microdynerus"));
        assert_eq!(
            species
                .classification
                .get(Rank::Subgenus),
            Some("Alastorynerus")
        );
    }

    #[test]
    fn hybrids() {
        let resource = parse("[species]", "Rumex conglomeratus x maritimus\nTilia x vulgaris\n");

        assert_eq!(name(&resource, "T1:1:1"), "Rumex conglomeratus×maritimus");
        assert_eq!(name(&resource, "T1:1:2"), "Tilia ×vulgaris");
    }

    #[test]
    fn placeholder_produces_no_taxon() {
        let resource = parse("[genus, species]", "Dolichurus A. Costa, 1886\n  [indet]\n");

        assert_eq!(resource.taxa.len(), 1);
        let genus = resource
            .taxa
            .get("T1:1:1")
            .unwrap();
        assert_eq!(genus.rank(), Rank::Genus);
        assert_eq!(genus.authorship.as_deref(), Some("A. Costa, 1886"));
    }

    #[test]
    fn skipped_rank() {
        let resource = parse("[family, genus, species]", "Sphecidae\n    haemorrhous\n");

        let species = resource
            .taxa
            .get("T1:1:2")
            .unwrap();
        assert_eq!(species.parent_id.as_deref(), Some("T1:1:1"));
        assert_eq!(species.classification.get(Rank::Family), Some("Sphecidae"));
        assert_eq!(species.classification.get(Rank::Genus), None);
    }

    #[test]
    fn correction_is_not_a_taxon() {
        let resource = parse("[genus, species]", "Drimus\n  > Drymus\n  sylvaticus\n");

        assert_eq!(resource.taxa.len(), 2);
        assert_eq!(name(&resource, "T1:1:1"), "Drymus");
        assert_eq!(name(&resource, "T1:1:2"), "Drymus sylvaticus");
        assert!(resource
            .taxa
            .iter()
            .all(|taxon| taxon.status != TaxonomicStatus::Incorrect));
    }

    #[test]
    fn clusters() {
        let resource = parse(
            "[genus, species]",
            "Drymus\n  [1] sylvaticus\n  [1] ryeii\n  [_] brunneus\nLygaeus\n  [1] equestris\n",
        );

        let first = resource
            .taxa
            .get("T1:1:2")
            .unwrap();
        assert_eq!(first.indistinguishable_from, vec!["T1:1:3".to_string()]);
        let second = resource
            .taxa
            .get("T1:1:3")
            .unwrap();
        assert_eq!(second.indistinguishable_from, vec!["T1:1:2".to_string()]);

        assert!(
            resource
                .taxa
                .get("T1:1:4")
                .unwrap()
                .not_identifiable
        );

        // same tag, different parent
        assert!(resource
            .taxa
            .get("T1:1:6")
            .unwrap()
            .indistinguishable_from
            .is_empty());
    }

    #[test]
    fn identifiers_unique_per_resource() {
        let source = format!(
            "{}\n\n===\n\n{}",
            document("[genus, species]", "Drymus\n  sylvaticus\n  ryeii\n"),
            document("[species]", "Lygaeus equestris\n  = Cimex equestris\n")
        );
        let resources = parsing::parse_file(&source, "B7", None).unwrap();

        assert_eq!(resources.len(), 2);
        assert_eq!(resources[0].id, "B7:1");
        assert_eq!(resources[1].id, "B7:2");
        assert_eq!(resources[1].file, "B7-2");

        for resource in &resources {
            let mut seen = Vec::new();
            for id in resource
                .taxa
                .ids()
            {
                let prefix = format!("{}:", resource.id);
                let number = id
                    .strip_prefix(&prefix)
                    .unwrap_or_else(|| panic!("{} outside {}", id, resource.id));
                assert!(number.parse::<u32>().is_ok(), "{}", id);
                assert!(!seen.contains(&id), "{} repeated", id);
                seen.push(id);
            }
        }
    }

    #[test]
    fn catalog_in_header() {
        let source = "---\nlevels: [species]\ncatalog:\n  id: B7\n  language: en; nl\n  title: Bugs; Wantsen\n---\n\nLygaeus equestris\n";
        let resources = parsing::parse_file(source, "B7", None).unwrap();

        let catalog = resources[0]
            .metadata
            .catalog
            .as_ref()
            .unwrap();
        assert_eq!(catalog.len(), 3);
    }
}

#[cfg(test)]
mod syntax {
    use std::path::Path;

    use taxonkeys::error::ParseFailure;
    use taxonkeys::parsing;

    fn document(levels: &str, content: &str) -> String {
        format!("---\nlevels: {}\n---\n\n{}", levels, content)
    }

    fn failure(source: &str) -> ParseFailure {
        match parsing::parse_file(source, "B1", None) {
            Ok(_) => panic!(
                "Expected parsing to fail, but it succeeded for input: {}",
                source
            ),
            Err(failure) => failure,
        }
    }

    /// Check that parsing produces exactly one error, reported as
    /// "line:column message".
    fn expect_error(source: &str, expected: &str) {
        let failure = failure(source);
        let errors: Vec<String> = failure
            .errors
            .iter()
            .map(ToString::to_string)
            .collect();

        assert_eq!(errors, vec![expected.to_string()], "for input '{}'", source);
    }

    #[test]
    fn odd_indentation() {
        expect_error(
            &document("[genus, species]", "Drymus\n   sylvaticus\n"),
            "6:1 Indentation should be a multiple of two spaces",
        );
    }

    #[test]
    fn too_much_indentation() {
        expect_error(
            &document("[genus, species]", "Drymus\n  sylvaticus\n    ryeii\n"),
            "7:1 Too much indentation",
        );

        // synonyms and corrections may go one and two levels deeper
        parsing::parse_file(
            &document(
                "[genus, species]",
                "Drymus\n  sylvaticus\n    = Drymus silvaticus\n      > Drymus sylvestris\n",
            ),
            "B1",
            None,
        )
        .unwrap();
    }

    #[test]
    fn missing_leaf_taxon() {
        expect_error(
            &document("[genus, species]", "Drymus\nLygaeus\n  equestris\n"),
            "5:1 Missing leaf taxon",
        );

        expect_error(
            &document(
                "[family, genus, species]",
                "Lygaeidae\n  Drymus\n  Lygaeus\n    equestris\n",
            ),
            "6:3 Missing leaf taxon",
        );
    }

    #[test]
    fn missing_leaf_taxa_allowed() {
        let source = "---\nlevels: [genus, species]\nflags: [missing-leaf-taxa]\n---\n\nDrymus\nLygaeus\n  equestris\n";
        let resources = parsing::parse_file(source, "B1", None).unwrap();

        assert_eq!(
            resources[0]
                .taxa
                .len(),
            3
        );
    }

    #[test]
    fn invalid_names() {
        expect_error(
            &document("[family, genus]", "lygaeidae\n  Drymus\n"),
            "5:1 Taxon name (family) should be capitalized: \"lygaeidae\"",
        );

        expect_error(
            &document("[genus, species]", "Drymus\n  sylvati.cus\n"),
            "6:3 Taxon name contains unexpected characters: \"sylvati.cus\"",
        );
    }

    #[test]
    fn invalid_corrections() {
        expect_error(
            &document("[species]", "> Drymus sylvaticus\n"),
            "5:1 Correction without a taxon to correct",
        );

        expect_error(
            &document(
                "[species]",
                "Drymus silvaticus\n  > Drymus sylvaticus\n  > Drymus sylvestris\n",
            ),
            "7:3 Taxon was already corrected",
        );
    }

    #[test]
    fn invalid_headers() {
        expect_error(
            "---\nlevels: genus\n---\n\nDrymus\n",
            "1 \"levels\" should be an array",
        );

        expect_error("levels: [genus]\nDrymus\n", "1 Resource should start with a header followed by \"---\"");

        expect_error(
            "---\nlevels: [genus]\nscope: [Lygaeidae]\n---\n\nDrymus\n",
            "1 \"scope\" data should go in \"catalog\"",
        );

        expect_error(
            "---\nlevels: [genus]\nflags: [missing-leaves]\n---\n\nDrymus\n",
            "1 \"flags\" contains invalid values: missing-leaves",
        );
    }

    #[test]
    fn all_errors_reported_in_order() {
        let source = format!(
            "{}\n\n===\n\n---\nlevels: [genus, superspecies]\n---\n\nDrymus\n",
            document(
                "[genus, species]",
                "Drymus\n   sylvaticus\nLygaeus\nNysius\n  ericae\n"
            )
        );
        let failure = failure(&source);

        let errors: Vec<String> = failure
            .errors
            .iter()
            .map(ToString::to_string)
            .collect();
        assert_eq!(
            errors,
            vec![
                "6:1 Indentation should be a multiple of two spaces".to_string(),
                "7:1 Missing leaf taxon".to_string(),
                "14 \"levels\" contains invalid values: superspecies".to_string(),
            ]
        );
        assert!(failure
            .to_string()
            .starts_with("Parsing failed with 3 errors"));
    }

    #[test]
    fn details_point_at_the_line() {
        let source = document("[genus, species]", "Drymus\n   sylvaticus\n");
        let details = failure(&source).full_details(Path::new("keys.txt"));

        assert!(details.contains("keys.txt:6:1"), "{}", details);
        assert!(details.contains("   sylvaticus"), "{}", details);
        assert!(details.contains("Indentation should be a multiple of two spaces"));
    }
}

use mesh_baffles::prelude::*;

const DICT: &str = r#"{
    "internalFacesOnly": true,
    "baffles": [
        {
            "name": "cut",
            "type": "plane",
            "point": [1.0, 0.5, 0.5],
            "normal": [1.0, 0.0, 0.0],
            "flip": true,
            "patches": [
                { "name": "cutMaster", "type": "wall",
                  "patchFields": { "p": { "type": "fixedValue", "value": 0.0 } } },
                { "name": "cutSlave", "type": "wall" }
            ]
        },
        {
            "name": "proc",
            "type": "faceList",
            "faces": [],
            "patches": [
                { "name": "p0", "type": "processor", "myProcNo": 0, "neighbProcNo": 1 },
                { "name": "p1", "type": "processor", "myProcNo": 0, "neighbProcNo": 1 }
            ]
        }
    ]
}"#;

#[test]
fn parses_full_dictionary() {
    let config = BafflesConfig::from_json(DICT).unwrap();
    assert!(config.internal_faces_only);
    assert!(!config.no_fields);
    assert_eq!(config.baffles.len(), 2);

    let cut = &config.baffles[0];
    assert_eq!(cut.kind, "plane");
    assert_eq!(cut.settings["flip"], serde_json::json!(true));
    assert_eq!(cut.patches[0].kind, PatchType::Wall);
    assert_eq!(
        cut.patches[0].patch_fields["p"],
        PatchFieldSpec::new("fixedValue", Some(0.0))
    );
    assert_eq!(
        config.baffles[1].patches[1].kind,
        PatchType::Processor {
            my_rank: 0,
            neighbour_rank: 1
        }
    );
    let names: Vec<String> = config.patch_names().into_iter().collect();
    assert_eq!(names, vec!["cutMaster", "cutSlave", "p0", "p1"]);
}

#[test]
fn loads_from_file_and_runs() {
    let path = std::env::temp_dir().join(format!("mesh_baffles_dict_{}.json", std::process::id()));
    std::fs::write(&path, DICT).unwrap();
    let config = BafflesConfig::load(&path).unwrap();
    std::fs::remove_file(&path).unwrap();

    let mesh = PolyMesh::block([2, 1, 1], [2.0, 1.0, 1.0]).unwrap();
    let out = create_baffles(&mesh, &FieldStore::new(), &config, &PolyTopoChange, &NoComm).unwrap();
    assert_eq!(out.report.converted, 1);

    // `flip` puts the master side on the neighbour cell.
    let master = out.mesh.find_patch("cutMaster").unwrap();
    let face = out.mesh.patch(master).start;
    assert_eq!(out.mesh.owner()[face], 1);
    assert_eq!(out.mesh.face(face), &mesh.face(0).reverse_face());
}

#[test]
fn missing_file_is_io_error() {
    let err = BafflesConfig::load("/definitely/not/here/createBafflesDict.json").unwrap_err();
    assert!(matches!(err, ConfigError::Io { .. }));
}

#[test]
fn broken_entries_fail_before_any_mesh_work() {
    let cases = [
        (r#"{"internalFacesOnly": false, "baffles": [{"name": "", "type": "faceList", "faces": []}]}"#, "empty name"),
        (r#"{"internalFacesOnly": false, "baffles": [{"name": "a", "type": "nope"}]}"#, "unknown selector"),
        (r#"{"internalFacesOnly": false, "baffles": [{"name": "a", "type": "faceList"}]}"#, "missing faces"),
        (r#"{"internalFacesOnly": false, "baffles": [{"name": "a", "type": "plane", "point": [0,0,0], "normal": [0,0,0]}]}"#, "zero normal"),
        (
            r#"{"internalFacesOnly": false, "baffles": [{"name": "a", "type": "faceList", "faces": [0],
                "patches": [{"name": "m", "type": "cyclic"}, {"name": "s"}]}]}"#,
            "cyclic without neighbour",
        ),
        (
            r#"{"internalFacesOnly": false, "baffles": [{"name": "a", "type": "faceList", "faces": [0]},
                            {"name": "a", "type": "faceList", "faces": [0]}]}"#,
            "duplicate",
        ),
        (r#"{"internalFacesOnly": false, "baffles": "#, "truncated"),
    ];
    for (text, what) in cases {
        assert!(BafflesConfig::from_json(text).is_err(), "{what} accepted");
    }
}

#[test]
fn hand_built_config_is_validated_by_pipeline() {
    let mesh = PolyMesh::block([2, 1, 1], [2.0, 1.0, 1.0]).unwrap();
    let config = BafflesConfig::new().with_baffle(
        BaffleSpec::new("a", "faceList", serde_json::json!({ "faces": [0] }))
            .with_patch(PatchSpec::new("", PatchType::Wall))
            .with_patch(PatchSpec::new("s", PatchType::Wall)),
    );
    let err = create_baffles(&mesh, &FieldStore::new(), &config, &PolyTopoChange, &NoComm)
        .unwrap_err();
    assert_eq!(
        err,
        BaffleError::Config(ConfigError::MissingPatchName {
            baffle: "a".into(),
            index: 0
        })
    );
}

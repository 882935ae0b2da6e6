use crate::{
    conversion::net_builder::{Diagnostic, RowContext},
    convert_path, export_petri_net_to_pnml_string, normalize_id,
    petri_net::petri_net_struct::{PlaceID, Position, TransitionID},
    utils::test_utils::get_test_data_path,
    ConversionOptions, InputError,
};

fn transport_id(from: &str, to: &str) -> String {
    format!("trans_{}_{}", normalize_id(from), normalize_id(to))
}

#[test]
fn csv_directory_end_to_end() {
    let path = get_test_data_path().join("supply_chain");
    let conversion = convert_path(&path, &ConversionOptions::default()).unwrap();
    let net = &conversion.net;

    // 7 warehouses + placeholder for 用户U3
    assert_eq!(net.places.len(), 8);
    // 2 demands + 7 transport edges
    assert_eq!(net.transitions.len(), 9);
    assert_eq!(net.arcs.len(), 16);
    assert!(net.validate().is_empty());

    let names = ["北京S1", "天津S2", "上海M1", "广州D1", "深圳D2", "用户U1", "用户U2", "用户U3"];
    let labels: Vec<&str> = net.places.values().map(|p| p.label.as_str()).collect();
    assert_eq!(labels, names);
    let ids: Vec<String> = names.iter().map(|n| normalize_id(n)).collect();
    assert!(net.places.keys().eq(ids.iter()));

    let s2 = net.place(&normalize_id("天津S2")).unwrap();
    assert_eq!(s2.position, Position::new(100, 220));
    assert_eq!(s2.marking_text().as_deref(), Some("80"));
    assert_eq!(s2.location, None);
    let m1 = net.place(&normalize_id("上海M1")).unwrap();
    assert_eq!(m1.location.unwrap().latitude, Some(31.23));
    let d2 = net.place(&normalize_id("深圳D2")).unwrap();
    assert_eq!(d2.position, Position::new(700, 220));
    let u2 = net.place(&normalize_id("用户U2")).unwrap();
    assert_eq!(u2.position, Position::new(1000, 220));

    // demand transitions come first
    let first: Vec<&str> = net.transitions.values().take(3).map(|t| t.label.as_str()).collect();
    assert_eq!(first, vec!["需求T1", "需求T2", "运输_北京S1_上海M1"]);
    let s2_m1 = transport_id("天津S2", "上海M1");
    assert_eq!(net.transition(&s2_m1).unwrap().position, Position::new(250, 220));
    let to_m1 = format!("arc_{s2_m1}_{}", normalize_id("上海M1"));
    assert_eq!(net.arcs[&to_m1].inscription_text().as_deref(), Some("3.5"));
    let d2_u2 = transport_id("深圳D2", "用户U2");
    let to_u2 = format!("arc_{d2_u2}_{}", normalize_id("用户U2"));
    assert_eq!(net.arcs[&to_u2].inscription, None);
    assert_eq!(
        net.transition(&transport_id("深圳D2", "用户U3")).unwrap().position,
        Position::new(400, 220)
    );

    let t2_id = TransitionID(normalize_id("需求T2"));
    let t2 = net.transition(t2_id.as_str()).unwrap();
    assert_eq!(t2.label, "需求T2");
    assert_eq!(t2.position, Position::new(1300, 220));
    assert_eq!(
        net.postset_of_transition(&t2_id),
        vec![PlaceID(normalize_id("用户U2"))]
    );
    assert_eq!(
        net.preset_of_place(&PlaceID(normalize_id("上海M1"))),
        vec![
            TransitionID(transport_id("北京S1", "上海M1")),
            TransitionID(s2_m1)
        ]
    );

    assert_eq!(conversion.diagnostics.len(), 3);
    assert_eq!(
        conversion.diagnostics[0],
        Diagnostic::UnresolvedWarehouse {
            context: RowContext::Transport,
            row: 7,
            name: "用户U3".into(),
            id: normalize_id("用户U3"),
        }
    );
}

#[test]
fn csv_end_to_end_pnml() {
    let path = get_test_data_path().join("supply_chain");
    let options = ConversionOptions::default();
    let conversion = convert_path(&path, &options).unwrap();
    let xml = export_petri_net_to_pnml_string(&conversion.net, &options.pnml).unwrap();

    assert_eq!(xml.matches("<place ").count(), 8);
    assert_eq!(xml.matches("<transition ").count(), 9);
    assert_eq!(xml.matches("<arc ").count(), 16);
    let (t1, u1) = (normalize_id("需求T1"), normalize_id("用户U1"));
    assert!(xml.contains(&format!(
        r#"<arc id="arc_{t1}_{u1}" source="{t1}" target="{u1}">"#
    )));
    assert!(xml.contains("<text>运输_北京S1_上海M1</text>"));
    assert!(xml.contains("<longitude>116.4</longitude>"));
    assert!(xml.contains("<latitude>39.9</latitude>"));
    // places before transitions before arcs
    let last_place = xml.rfind("<place ").unwrap();
    let first_transition = xml.find("<transition ").unwrap();
    let last_transition = xml.rfind("<transition ").unwrap();
    let first_arc = xml.find("<arc ").unwrap();
    assert!(last_place < first_transition);
    assert!(last_transition < first_arc);
}

#[test]
fn conversion_is_deterministic() {
    let path = get_test_data_path().join("supply_chain");
    let options = ConversionOptions::default();
    let render = || {
        let conversion = convert_path(&path, &options).unwrap();
        export_petri_net_to_pnml_string(&conversion.net, &options.pnml).unwrap()
    };
    assert_eq!(render(), render());
}

#[test]
fn renamed_columns_through_options() {
    let path = get_test_data_path().join("supply_chain");
    let mut options = ConversionOptions::default();
    options.columns.transit_time = "时长".into();
    // optional numeric column: simply absent
    let conversion = convert_path(&path, &options).unwrap();
    let demand_arcs = conversion
        .net
        .arcs
        .values()
        .filter(|a| a.inscription.is_some())
        .count();
    assert_eq!(demand_arcs, 2);

    options.columns.edge_from = "来源".into();
    let err = convert_path(&path, &options).unwrap_err();
    assert!(matches!(
        err,
        InputError::MissingColumn { ref column, .. } if column == "来源"
    ));
}

#[cfg(feature = "xlsx")]
#[test]
fn workbook_end_to_end() {
    use crate::{convert_tables, Importable, SupplyChainTables};

    let path = get_test_data_path().join("supply_chain.xlsx");
    let tables = SupplyChainTables::import_from_path(&path).unwrap();
    assert_eq!(tables.nodes.name, "节点输入");
    assert_eq!(tables.nodes.shape(), (3, 5));
    assert_eq!(tables.demands.headers[1], "仓库名称\n（用户）");

    let conversion = convert_tables(&tables, &ConversionOptions::default()).unwrap();
    let net = &conversion.net;
    assert!(conversion.diagnostics.is_empty());
    let (a, b) = (normalize_id("仓A"), normalize_id("仓B"));
    let place_a = net.place(&a).unwrap();
    assert_eq!(place_a.position, Position::new(400, 100));
    assert_eq!(place_a.marking_text().as_deref(), Some("50"));
    assert_eq!(place_a.location.unwrap().longitude, Some(116.4));

    let user = normalize_id("用户甲");
    assert!(user.starts_with("id_"));
    assert_eq!(net.place(&user).unwrap().position, Position::new(1000, 100));

    let transport = transport_id("仓A", "仓B");
    assert_eq!(
        net.transition(&transport).unwrap().position,
        Position::new(550, 100)
    );
    assert_eq!(
        net.arcs[&format!("arc_{transport}_{b}")].inscription_text().as_deref(),
        Some("4")
    );
    let to_user = format!("arc_trans_{b}_{user}_{user}");
    assert_eq!(net.arcs[&to_user].inscription_text().as_deref(), Some("1.5"));
    let demand = format!("arc_Order_1_{user}");
    assert_eq!(net.arcs[&demand].inscription_text().as_deref(), Some("20"));
    assert_eq!(
        net.transition("Order_1").unwrap().position,
        Position::new(1300, 100)
    );
}

#[cfg(feature = "xlsx")]
#[test]
fn missing_sheet_is_fatal() {
    let path = get_test_data_path().join("supply_chain.xlsx");
    let mut options = ConversionOptions::default();
    options.columns.demand_sheet = "Demands".into();
    let err = convert_path(&path, &options).unwrap_err();
    match err {
        InputError::MissingSheet { sheet, available } => {
            assert_eq!(sheet, "Demands");
            assert_eq!(available, "节点输入, 连边输入, 需求输入");
        }
        other => panic!("unexpected error: {other}"),
    }

    options.columns.fallback_to_sheet_order = true;
    let conversion = convert_path(&path, &options).unwrap();
    assert_eq!(conversion.net.transitions.len(), 3);
}

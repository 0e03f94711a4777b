use agentmem_core::model::{scope_proximity, Scope};

#[test]
fn rank_orders_session_below_global() {
    let session = Scope::Session {
        id: "s".to_string(),
    };
    let project = Scope::Project {
        id: "p".to_string(),
    };
    let org = Scope::Org {
        id: "o".to_string(),
    };
    assert!(session.rank() < project.rank());
    assert!(project.rank() < org.rank());
    assert!(org.rank() < Scope::Global.rank());
}

#[test]
fn scope_proximity_weights_most_specific_highest() {
    let chain = vec![
        Scope::Project {
            id: "p".to_string(),
        },
        Scope::Org {
            id: "o".to_string(),
        },
        Scope::Global,
    ];
    let p = scope_proximity(&chain, &chain[0]).unwrap();
    let o = scope_proximity(&chain, &chain[1]).unwrap();
    let g = scope_proximity(&chain, &chain[2]).unwrap();
    assert!(p > o);
    assert!(o > g);
    assert!((p - 1.0).abs() < 1e-9);
}

#[test]
fn scope_proximity_is_none_for_singleton_chain() {
    let chain = vec![Scope::Global];
    assert_eq!(scope_proximity(&chain, &Scope::Global), None);
}

#[test]
fn scope_proximity_is_none_when_scope_not_in_chain() {
    let chain = vec![
        Scope::Project {
            id: "p".to_string(),
        },
        Scope::Global,
    ];
    let other = Scope::Project {
        id: "q".to_string(),
    };
    assert_eq!(scope_proximity(&chain, &other), None);
}

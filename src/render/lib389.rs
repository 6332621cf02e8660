//! lib389 / pytest test stub renderer.
//!
//! Writes the parts of a ticket test script that only depend on the topology:
//! the topology class and fixture, agreement creation and initialization, the
//! replication check, the empty test body, the cleanup test, and
//! `run_isolated()`. The test body is left for the author to fill in.

use crate::plan::TopologyPlan;
use crate::render::PlanRenderer;
use crate::topology::{Agreement, AgreementKind, Node, NodeId, Role};

const INDENT: &str = "    ";

/// Number of one second polls before the replication check gives up
const REPL_CHECK_RETRIES: u32 = 10;

/// Renders a plan as a lib389 pytest script
#[derive(Debug, Clone, Copy, Default)]
pub struct Lib389Renderer;

impl PlanRenderer for Lib389Renderer {
    fn render(&self, plan: &TopologyPlan, ticket: &str) -> color_eyre::eyre::Result<String> {
        let mut script = String::new();

        write_header(&mut script);
        write_topology_class(&mut script, plan);
        write_fixture(&mut script, plan);
        write_tests(&mut script, plan, ticket);

        Ok(script)
    }

    fn executable(&self) -> bool {
        true
    }
}

fn write_header(script: &mut String) {
    script.push_str("import os\nimport sys\nimport time\nimport ldap\nimport ldap.sasl\n");
    script.push_str("import logging\nimport socket\nimport pytest\n");
    script.push_str("from lib389 import DirSrv, Entry, tools, tasks\n");
    script.push_str("from lib389.tools import DirSrvTools\n");
    script.push_str("from lib389._constants import *\n");
    script.push_str("from lib389.properties import *\n");
    script.push_str("from lib389.tasks import *\n\n");

    script.push_str("logging.getLogger(__name__).setLevel(logging.DEBUG)\n");
    script.push_str("log = logging.getLogger(__name__)\n\n");
    script.push_str("installation1_prefix = None\n\n\n");
}

fn topology_class_name(plan: &TopologyPlan) -> &'static str {
    if plan.is_replicated() {
        "TopologyReplication"
    } else {
        "TopologyStandalone"
    }
}

fn node_names(plan: &TopologyPlan) -> Vec<&str> {
    plan.nodes.iter().map(|n| n.name.as_str()).collect()
}

fn write_topology_class(script: &mut String, plan: &TopologyPlan) {
    let names = node_names(plan);

    script.push_str(&format!("class {}(object):\n", topology_class_name(plan)));
    script.push_str(&format!("{}def __init__(self, {}):\n", INDENT, names.join(", ")));
    for name in &names {
        script.push_str(&format!("{0}{0}{1}.open()\n", INDENT, name));
        script.push_str(&format!("{0}{0}self.{1} = {1}\n", INDENT, name));
    }
    script.push_str("\n\n");
}

fn replica_role_constant(role: Role) -> &'static str {
    match role {
        Role::Master => "REPLICAROLE_MASTER",
        Role::Hub => "REPLICAROLE_HUB",
        Role::Consumer | Role::Standalone => "REPLICAROLE_CONSUMER",
    }
}

fn write_instance(script: &mut String, node: &Node) {
    let name = &node.name;
    let args = format!("args_{}", if node.role() == Role::Standalone { name.as_str() } else { node.role().as_str() });

    script.push_str(&format!("{}# Creating {} {}...\n", INDENT, node.role(), node.id.index));
    script.push_str(&format!("{}{} = DirSrv(verbose=False)\n", INDENT, name));
    script.push_str(&format!("{}args_instance[SER_HOST] = {}\n", INDENT, node.host));
    script.push_str(&format!("{}args_instance[SER_PORT] = {}\n", INDENT, node.port));
    script.push_str(&format!("{}args_instance[SER_SERVERID_PROP] = {}\n", INDENT, node.server_id));
    script.push_str(&format!("{}{} = args_instance.copy()\n", INDENT, args));
    script.push_str(&format!("{}{}.allocate({})\n", INDENT, name, args));
    script.push_str(&format!("{}instance_{} = {}.exists()\n", INDENT, name, name));
    script.push_str(&format!("{}if instance_{}:\n", INDENT, name));
    script.push_str(&format!("{0}{0}{1}.delete()\n", INDENT, name));
    script.push_str(&format!("{}{}.create()\n", INDENT, name));
    script.push_str(&format!("{}{}.open()\n", INDENT, name));
    if let Some(replica_id) = &node.replica_id {
        script.push_str(&format!(
            "{}{}.replica.enableReplication(suffix=SUFFIX, role={}, replicaId={})\n",
            INDENT,
            name,
            replica_role_constant(node.role()),
            replica_id
        ));
    }
    script.push('\n');
}

fn write_agreement(script: &mut String, agreement: &Agreement) {
    let var = agreement.var_name();
    let source = agreement.source.var_name();
    let target = agreement.target.var_name();

    script.push_str(&format!("{}# Creating agreement from {} to {}\n", INDENT, agreement.source, agreement.target));
    script.push_str(&format!("{}properties = {{RA_NAME:      r'meTo_$host:$port',\n", INDENT));
    script.push_str("                  RA_BINDDN:    defaultProperties[REPLICATION_BIND_DN],\n");
    script.push_str("                  RA_BINDPW:    defaultProperties[REPLICATION_BIND_PW],\n");
    script.push_str("                  RA_METHOD:    defaultProperties[REPLICATION_BIND_METHOD],\n");
    script.push_str("                  RA_TRANSPORT_PROT: defaultProperties[REPLICATION_TRANSPORT]}\n");
    script.push_str(&format!(
        "{}{} = {}.agreement.create(suffix=SUFFIX, host={}.host, port={}.port, properties=properties)\n",
        INDENT, var, source, target, target
    ));
    script.push_str(&format!("{}if not {}:\n", INDENT, var));
    script.push_str(&format!(
        "{0}{0}log.fatal(\"Fail to create a {1} replica agreement\")\n",
        INDENT,
        agreement_kind_label(agreement.kind)
    ));
    script.push_str(&format!("{0}{0}sys.exit(1)\n", INDENT));
    script.push_str(&format!("{}log.debug(\"%s created\" % {})\n\n", INDENT, var));
}

fn agreement_kind_label(kind: AgreementKind) -> String {
    format!("{} -> {}", kind.source_role(), kind.target_role())
}

fn write_section_banner(script: &mut String, title: &str) {
    script.push_str(&format!("{}#\n{}# {}\n{}#\n", INDENT, INDENT, title, INDENT));
}

fn write_initializations(script: &mut String, plan: &TopologyPlan) {
    write_section_banner(script, "Initialize all the agreements");
    for action in &plan.init_order {
        let lookup = (plan.agreement(action), plan.node(action.target));
        debug_assert!(
            lookup.0.is_some() && lookup.1.is_some(),
            "init action {} -> {} is not in the plan",
            action.source,
            action.target
        );
        let (Some(agreement), Some(target)) = lookup else {
            continue;
        };
        let source = action.source.var_name();
        script.push_str(&format!(
            "{}{}.agreement.init(SUFFIX, {}, {})\n",
            INDENT, source, target.host, target.port
        ));
        script.push_str(&format!("{}{}.waitForReplInit({})\n", INDENT, source, agreement.var_name()));
    }
    script.push('\n');
}

fn write_replication_check(script: &mut String, target: NodeId) {
    let origin = NodeId::tier_origin(Role::Master).var_name();

    write_section_banner(script, "Check replication is working...");
    script.push_str(&format!("{}REPL_TEST_DN = 'cn=test repl,' + SUFFIX\n", INDENT));
    script.push_str(&format!("{}{}.add_s(Entry((REPL_TEST_DN, {{\n", INDENT, origin));
    script.push_str("                  'objectclass': 'top person'.split(),\n");
    script.push_str("                  'sn': 'test_repl',\n");
    script.push_str("                  'cn': 'test_repl'})))\n");
    script.push_str(&format!("{}loop = 0\n", INDENT));
    script.push_str(&format!("{}ent = None\n", INDENT));
    script.push_str(&format!("{}while loop <= {}:\n", INDENT, REPL_CHECK_RETRIES));
    script.push_str(&format!("{0}{0}try:\n", INDENT));
    script.push_str(&format!(
        "{0}{0}{0}ent = {1}.getEntry(REPL_TEST_DN, ldap.SCOPE_BASE, \"(objectclass=*)\")\n",
        INDENT,
        target.var_name()
    ));
    script.push_str(&format!("{0}{0}{0}break\n", INDENT));
    script.push_str(&format!("{0}{0}except ldap.NO_SUCH_OBJECT:\n", INDENT));
    script.push_str(&format!("{0}{0}{0}time.sleep(1)\n", INDENT));
    script.push_str(&format!("{0}{0}{0}loop += 1\n", INDENT));
    script.push_str(&format!("{}if ent is None:\n", INDENT));
    script.push_str(&format!("{0}{0}assert False\n\n", INDENT));
}

fn write_fixture(script: &mut String, plan: &TopologyPlan) {
    script.push_str("@pytest.fixture(scope=\"module\")\n");
    script.push_str("def topology(request):\n");
    script.push_str(&format!("{}global installation1_prefix\n", INDENT));
    script.push_str(&format!("{}if installation1_prefix:\n", INDENT));
    script.push_str(&format!("{0}{0}args_instance[SER_DEPLOYED_DIR] = installation1_prefix\n\n", INDENT));

    for node in &plan.nodes {
        write_instance(script, node);
    }

    if !plan.agreements.is_empty() {
        write_section_banner(script, "Create all the agreements");
        for agreement in &plan.agreements {
            write_agreement(script, agreement);
        }
    }

    if !plan.init_order.is_empty() {
        write_initializations(script, plan);
    }

    if let Some(target) = plan.verification_target {
        write_replication_check(script, target);
    }

    let first = plan.nodes.first().map(|n| n.name.as_str()).unwrap_or("standalone");
    script.push_str(&format!("{}# Clear out the tmp dir\n", INDENT));
    script.push_str(&format!("{}{}.clearTmpDir(__file__)\n\n", INDENT, first));
    script.push_str(&format!(
        "{}return {}({})\n\n\n",
        INDENT,
        topology_class_name(plan),
        node_names(plan).join(", ")
    ));
}

fn write_tests(script: &mut String, plan: &TopologyPlan, ticket: &str) {
    script.push_str(&format!("def test_ticket{}(topology):\n", ticket));
    script.push_str(&format!("{}'''\n", INDENT));
    if plan.is_replicated() {
        script.push_str(&format!("{}Write your replication testcase here.\n\n", INDENT));
        let mut access: Vec<String> = [Role::Master, Role::Hub, Role::Consumer]
            .into_iter()
            .filter_map(|role| plan.nodes_with_role(role).next())
            .map(|node| format!("topology.{}", node.name))
            .collect();
        access.push("...".to_string());
        script.push_str(&format!("{}To access each DirSrv instance use:  {}\n", INDENT, access.join(", ")));
    } else {
        script.push_str(&format!("{}Write your testcase here...\n", INDENT));
    }
    script.push_str(&format!("{}'''\n\n", INDENT));
    script.push_str(&format!("{}log.info('Test complete')\n\n\n", INDENT));

    script.push_str(&format!("def test_ticket{}_final(topology):\n", ticket));
    for node in &plan.nodes {
        script.push_str(&format!("{}topology.{}.delete()\n", INDENT, node.name));
    }
    script.push_str(&format!("{}log.info('Testcase PASSED')\n\n\n", INDENT));

    script.push_str("def run_isolated():\n");
    script.push_str(&format!("{}global installation1_prefix\n", INDENT));
    script.push_str(&format!("{}installation1_prefix = None\n\n", INDENT));
    script.push_str(&format!("{}topo = topology(True)\n", INDENT));
    script.push_str(&format!("{}test_ticket{}(topo)\n", INDENT, ticket));
    script.push_str(&format!("{}test_ticket{}_final(topo)\n\n\n", INDENT, ticket));

    script.push_str("if __name__ == '__main__':\n");
    script.push_str(&format!("{}run_isolated()\n", INDENT));
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{Deployment, RoleCounts};

    fn render(deployment: Deployment) -> String {
        Lib389Renderer.render(&TopologyPlan::build(&deployment), "47910").unwrap()
    }

    fn replication(masters: usize, hubs: usize, consumers: usize) -> String {
        render(Deployment::Replication(RoleCounts { masters, hubs, consumers }))
    }

    #[test]
    fn test_standalone_script() {
        let script = render(Deployment::Standalone { instances: 2 });
        assert!(script.contains("class TopologyStandalone(object):"));
        assert!(script.contains("def __init__(self, standalone, standalone2):"));
        assert!(script.contains("args_instance[SER_HOST] = HOST_STANDALONE2\n"));
        assert!(script.contains("standalone.clearTmpDir(__file__)"));
        assert!(script.contains("return TopologyStandalone(standalone, standalone2)"));
        assert!(!script.contains("enableReplication"));
        assert!(!script.contains("REPL_TEST_DN"));
    }

    #[test]
    fn test_replication_script_sections() {
        let script = replication(1, 1, 2);
        assert!(script.contains("class TopologyReplication(object):"));
        assert!(script.contains(
            "hub1.replica.enableReplication(suffix=SUFFIX, role=REPLICAROLE_HUB, replicaId=REPLICAID_HUB_1)"
        ));
        assert!(script.contains("replicaId=CONSUMER_REPLICAID)"));
        assert!(script.contains(
            "m1_to_h1_agmt = master1.agreement.create(suffix=SUFFIX, host=hub1.host, port=hub1.port, properties=properties)"
        ));
        assert!(script.contains("log.fatal(\"Fail to create a hub -> consumer replica agreement\")"));
        assert!(script.contains("ent = consumer1.getEntry(REPL_TEST_DN"));
        assert!(script.contains("return TopologyReplication(master1, hub1, consumer1, consumer2)"));
    }

    #[test]
    fn test_init_lines_follow_plan_order() {
        let script = replication(2, 1, 1);
        let expected = "    master1.agreement.init(SUFFIX, HOST_MASTER_2, PORT_MASTER_2)\n\
                        \x20   master1.waitForReplInit(m1_to_m2_agmt)\n\
                        \x20   master1.agreement.init(SUFFIX, HOST_HUB_1, PORT_HUB_1)\n\
                        \x20   master1.waitForReplInit(m1_to_h1_agmt)\n\
                        \x20   hub1.agreement.init(SUFFIX, HOST_CONSUMER_1, PORT_CONSUMER_1)\n\
                        \x20   hub1.waitForReplInit(h1_to_c1_agmt)\n";
        assert!(script.contains(expected), "{}", script);
    }

    #[test]
    #[cfg(debug_assertions)]
    #[should_panic(expected = "is not in the plan")]
    fn test_init_action_without_agreement_panics() {
        let mut plan = TopologyPlan::build(&Deployment::Replication(RoleCounts { masters: 2, hubs: 0, consumers: 0 }));
        plan.agreements.clear();
        let _ = Lib389Renderer.render(&plan, "47910");
    }

    #[test]
    fn test_single_master_skips_agreements_and_check() {
        let script = replication(1, 0, 0);
        assert!(!script.contains("Create all the agreements"));
        assert!(!script.contains("Initialize all the agreements"));
        assert!(!script.contains("REPL_TEST_DN"));
        assert!(script.contains("master1.clearTmpDir(__file__)"));
    }

    #[test]
    fn test_master_mesh_check_uses_second_master() {
        let script = replication(3, 0, 0);
        assert!(script.contains("ent = master2.getEntry("));
        assert_eq!(script.matches(".agreement.create(").count(), 6);
    }

    #[test]
    fn test_ticket_functions() {
        let script = replication(2, 0, 0);
        assert!(script.contains("def test_ticket47910(topology):"));
        assert!(script.contains("def test_ticket47910_final(topology):"));
        assert!(script.contains("    topology.master2.delete()\n"));
        assert!(script.contains("    test_ticket47910_final(topo)\n"));
        assert!(script.ends_with("if __name__ == '__main__':\n    run_isolated()\n"));
    }
}

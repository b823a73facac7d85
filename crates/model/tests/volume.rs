use std::collections::HashMap;

use compplan_model::{participant::Side, test::TestNetwork, volume::Volumes};
use rand::{rngs::StdRng, Rng, SeedableRng};
use rust_decimal::Decimal;

struct RandomTree {
    net: TestNetwork,
    children: HashMap<u64, Vec<(Side, u64)>>,
    recruits: HashMap<u64, Vec<u64>>,
    personal: HashMap<u64, Decimal>,
}

fn random_tree(seed: u64, size: u64) -> RandomTree {
    let mut rng = StdRng::seed_from_u64(seed);
    let mut net = TestNetwork::default();
    let mut children: HashMap<u64, Vec<(Side, u64)>> = HashMap::new();
    let mut recruits: HashMap<u64, Vec<u64>> = HashMap::new();
    let mut personal = HashMap::new();

    net.root(1);
    let mut slots = vec![(1, Side::Left), (1, Side::Right)];
    for id in 2..=size {
        let (parent, side) = slots.swap_remove(rng.gen_range(0, slots.len()));
        let sponsor = rng.gen_range(1, id);
        net.enroll_under(id, sponsor, parent, side);
        children.entry(parent).or_default().push((side, id));
        recruits.entry(sponsor).or_default().push(id);
        slots.push((id, Side::Left));
        slots.push((id, Side::Right));
    }
    for id in 1..=size {
        let volume = Decimal::from(rng.gen_range(0u64, 1_000));
        net.order(id, volume);
        personal.insert(id, volume);
    }

    RandomTree {
        net,
        children,
        recruits,
        personal,
    }
}

impl RandomTree {
    fn binary_subtree(&self, id: u64) -> Decimal {
        let mut total = self.personal[&id];
        for (_, child) in self.children.get(&id).into_iter().flatten() {
            total += self.binary_subtree(*child);
        }
        total
    }

    fn leg(&self, id: u64, side: Side) -> Decimal {
        self.children
            .get(&id)
            .into_iter()
            .flatten()
            .find(|(child_side, _)| *child_side == side)
            .map(|(_, child)| self.binary_subtree(*child))
            .unwrap_or_default()
    }

    fn group(&self, id: u64) -> Decimal {
        self.recruits
            .get(&id)
            .into_iter()
            .flatten()
            .map(|recruit| self.personal[recruit] + self.group(*recruit))
            .sum()
    }

    fn level(&self, id: u64, level: usize) -> Decimal {
        if level == 0 {
            return self.personal[&id];
        }
        self.recruits
            .get(&id)
            .into_iter()
            .flatten()
            .map(|recruit| self.level(*recruit, level - 1))
            .sum()
    }
}

fn check(tree: &RandomTree, id: u64, volumes: &Volumes) {
    assert_eq!(volumes.personal, tree.personal[&id], "personal of {id}");
    assert_eq!(volumes.left_leg, tree.leg(id, Side::Left), "left leg of {id}");
    assert_eq!(volumes.right_leg, tree.leg(id, Side::Right), "right leg of {id}");
    assert_eq!(volumes.group, tree.group(id), "group of {id}");
    for level in 1..=volumes.levels.len() {
        assert_eq!(volumes.level(level), tree.level(id, level), "level {level} of {id}");
    }
}

#[test]
fn legs_equal_subtree_sums() -> compplan_model::Result<()> {
    for seed in 0..8 {
        let size = 200;
        let tree = random_tree(seed, size);
        let sheet = tree.net.aggregate()?;
        for id in 1..=size {
            check(&tree, id, sheet.get(tree.net.idx(id)?));
        }
        let root = sheet.get(tree.net.idx(1)?);
        assert_eq!(
            root.personal + root.team()?,
            *sheet.company_volume(),
            "root covers the whole tree"
        );
    }
    Ok(())
}

#[test]
fn deep_chain_does_not_overflow_stack() -> compplan_model::Result<()> {
    let depth = 100_000;
    let mut net = TestNetwork::default();
    net.root(1);
    for id in 2..=depth {
        net.enroll(id, id - 1, Side::Left);
    }
    net.order(depth, Decimal::ONE);
    let sheet = net.aggregate()?;
    let root = sheet.get(net.idx(1)?);
    assert_eq!(root.left_leg, Decimal::ONE);
    assert_eq!(root.right_leg, Decimal::ZERO);
    assert_eq!(root.group, Decimal::ONE);
    assert_eq!(root.level(5), Decimal::ZERO);
    Ok(())
}

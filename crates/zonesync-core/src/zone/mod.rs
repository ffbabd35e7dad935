// # Zone Model
//
// In-memory form of a zone file: an ordered multimap from owner name to
// record sets, each set holding the rdata of one type with a shared TTL.
//
// Owners are kept absolute (trailing dot) and in order of first appearance,
// so that a zone read from the backend is written back in the shape its
// human editor left it. Rdata content is kept in well-formed zone-file
// representation; see [`crate::content`] for the conversions.
//
// ## Invariants
//
// - No owner node without record sets, no record set without rdata
//   (mutations drop what they empty)
// - Rdata inside one set is unique
// - A set's TTL is the minimum TTL of the rdata added to it

pub mod zonefile;

use crate::names;

/// One record value. Equality is structural over type and content.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Rdata {
    rtype: String,
    content: String,
}

impl Rdata {
    /// Create an rdata from well-formed content
    pub fn new(rtype: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            rtype: rtype.into().to_ascii_uppercase(),
            content: content.into(),
        }
    }

    /// Record type
    pub fn rtype(&self) -> &str {
        &self.rtype
    }

    /// Well-formed content
    pub fn content(&self) -> &str {
        &self.content
    }
}

/// All rdata of one type at one owner
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RdataSet {
    rtype: String,
    ttl: u32,
    rdatas: Vec<Rdata>,
}

impl RdataSet {
    /// Create an empty set
    pub fn new(rtype: impl Into<String>) -> Self {
        Self {
            rtype: rtype.into().to_ascii_uppercase(),
            ttl: 0,
            rdatas: Vec::new(),
        }
    }

    /// Record type
    pub fn rtype(&self) -> &str {
        &self.rtype
    }

    /// Shared TTL; 0 for an empty set
    pub fn ttl(&self) -> u32 {
        self.ttl
    }

    /// Rdata in insertion order
    pub fn rdatas(&self) -> &[Rdata] {
        &self.rdatas
    }

    /// Number of rdata
    pub fn len(&self) -> usize {
        self.rdatas.len()
    }

    /// Whether the set holds no rdata
    pub fn is_empty(&self) -> bool {
        self.rdatas.is_empty()
    }

    /// Whether the set holds the given well-formed content
    pub fn contains(&self, content: &str) -> bool {
        self.rdatas.iter().any(|r| r.content == content)
    }

    /// Add well-formed content
    ///
    /// Returns `false` when the content is already present. The set's TTL
    /// becomes `ttl` for the first rdata and the minimum afterwards.
    pub fn add(&mut self, ttl: u32, content: impl Into<String>) -> bool {
        let content = content.into();
        if self.contains(&content) {
            return false;
        }
        self.ttl = if self.rdatas.is_empty() {
            ttl
        } else {
            self.ttl.min(ttl)
        };
        self.rdatas.push(Rdata::new(self.rtype.clone(), content));
        true
    }
}

/// Record sets sharing an owner name
#[derive(Debug, Clone, PartialEq, Eq)]
struct Node {
    owner: String,
    rdatasets: Vec<RdataSet>,
}

/// Ordered multimap of owner name to record sets
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ZoneRecords {
    origin: String,
    nodes: Vec<Node>,
}

impl ZoneRecords {
    /// Create an empty record set anchored at `origin`
    pub fn new(origin: &str) -> Self {
        Self {
            origin: absolute(origin),
            nodes: Vec::new(),
        }
    }

    /// Parse zone-file text anchored at `origin`
    pub fn from_text(text: &str, origin: &str) -> crate::Result<Self> {
        zonefile::parse(text, &absolute(origin))
    }

    /// Zone-file text, with names relative to the origin when `relative`
    pub fn to_text(&self, relative: bool) -> String {
        zonefile::write(self, relative)
    }

    /// Absolute origin
    pub fn origin(&self) -> &str {
        &self.origin
    }

    /// Whether the zone holds no records
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Iterate over `(owner, set)` pairs in zone order
    pub fn iter(&self) -> impl Iterator<Item = (&str, &RdataSet)> {
        self.nodes.iter().flat_map(|node| {
            node.rdatasets
                .iter()
                .filter(|set| !set.is_empty())
                .map(move |set| (node.owner.as_str(), set))
        })
    }

    /// Record set for `(owner, rtype)`
    pub fn rdataset(&self, owner: &str, rtype: &str) -> Option<&RdataSet> {
        let owner = self.absolutize(owner);
        self.nodes
            .iter()
            .find(|node| node.owner.eq_ignore_ascii_case(&owner))?
            .rdatasets
            .iter()
            .find(|set| set.rtype.eq_ignore_ascii_case(rtype))
    }

    /// Record set for `(owner, rtype)`, created empty when absent
    pub fn get_or_create(&mut self, owner: &str, rtype: &str) -> &mut RdataSet {
        let owner = self.absolutize(owner);
        let node_idx = match self
            .nodes
            .iter()
            .position(|node| node.owner.eq_ignore_ascii_case(&owner))
        {
            Some(idx) => idx,
            None => {
                self.nodes.push(Node {
                    owner,
                    rdatasets: Vec::new(),
                });
                self.nodes.len() - 1
            }
        };

        let node = &mut self.nodes[node_idx];
        let set_idx = match node
            .rdatasets
            .iter()
            .position(|set| set.rtype.eq_ignore_ascii_case(rtype))
        {
            Some(idx) => idx,
            None => {
                node.rdatasets.push(RdataSet::new(rtype));
                node.rdatasets.len() - 1
            }
        };
        &mut node.rdatasets[set_idx]
    }

    /// Insert well-formed content unless it is already present
    ///
    /// A set whose TTL lies strictly between 0 and `configured_ttl` keeps it;
    /// otherwise the new rdata uses `configured_ttl`. Returns whether the zone
    /// changed.
    pub fn apply_upsert(
        &mut self,
        owner: &str,
        rtype: &str,
        configured_ttl: u32,
        content: &str,
    ) -> bool {
        let set = self.get_or_create(owner, rtype);
        if set.contains(content) {
            return false;
        }
        let ttl = if set.ttl() > 0 && set.ttl() < configured_ttl {
            set.ttl()
        } else {
            configured_ttl
        };
        set.add(ttl, content)
    }

    /// Remove the rdata of `(owner, rtype)` matching `predicate`
    ///
    /// The set is replaced by the kept rdata, or dropped entirely when nothing
    /// is kept. Returns the number of removed rdata.
    pub fn apply_remove_matching<F>(&mut self, owner: &str, rtype: &str, predicate: F) -> usize
    where
        F: Fn(&Rdata) -> bool,
    {
        let owner = self.absolutize(owner);
        let Some(node_idx) = self
            .nodes
            .iter()
            .position(|node| node.owner.eq_ignore_ascii_case(&owner))
        else {
            return 0;
        };

        let node = &mut self.nodes[node_idx];
        let Some(set_idx) = node
            .rdatasets
            .iter()
            .position(|set| set.rtype.eq_ignore_ascii_case(rtype))
        else {
            return 0;
        };

        let set = &mut node.rdatasets[set_idx];
        let (matched, kept): (Vec<Rdata>, Vec<Rdata>) =
            set.rdatas.drain(..).partition(|rdata| predicate(rdata));

        if kept.is_empty() {
            node.rdatasets.remove(set_idx);
        } else {
            set.rdatas = kept;
        }
        if node.rdatasets.is_empty() {
            self.nodes.remove(node_idx);
        }
        matched.len()
    }

    /// Drop the whole `(owner, rtype)` set
    pub fn delete_rdataset(&mut self, owner: &str, rtype: &str) -> bool {
        self.apply_remove_matching(owner, rtype, |_| true) > 0
    }

    /// Add a parsed record, keeping existing sets' minimum TTL
    pub(crate) fn insert_parsed(&mut self, owner: &str, rtype: &str, ttl: u32, content: String) {
        self.get_or_create(owner, rtype).add(ttl, content);
    }

    fn absolutize(&self, owner: &str) -> String {
        names::absolutize(owner, &self.origin)
    }
}

/// A zone loaded from the backend for one authenticated session
#[derive(Debug, Clone)]
pub struct Zone {
    /// Backend zone id
    pub id: u64,
    /// Zone name without trailing dot
    pub name: String,
    /// Token the update form must echo back
    pub csrf_token: String,
    /// Parsed records
    pub records: ZoneRecords,
}

fn absolute(name: &str) -> String {
    if name.ends_with('.') {
        name.to_string()
    } else {
        format!("{}.", name)
    }
}

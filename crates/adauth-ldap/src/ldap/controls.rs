//! Server-side sort and virtual list view controls
//!
//! ldap3 does not ship these controls, so they are encoded here with its
//! ASN.1 layer the same way the library encodes its own request controls.
//!
//! - Sort request (RFC 2891): `SEQUENCE OF SEQUENCE { attributeType, orderingRule [0] OPTIONAL, reverseOrder [1] BOOLEAN }`
//! - VLV request: `SEQUENCE { beforeCount, afterCount, byOffset [0] SEQUENCE { offset, contentCount } }`
//! - VLV response: `SEQUENCE { targetPosition, contentCount, virtualListViewResult ENUMERATED, contextID OPTIONAL }`

use adauth_core::{Error, Result};
use bytes::BytesMut;
use ldap3::asn1::{
    parse_tag, parse_uint, write, ASNTag, Boolean, Integer, OctetString, Sequence, StructureTag,
    Tag, TagClass, Types,
};
use ldap3::controls::RawControl;

use super::search::SearchFilter;

pub const SORT_REQUEST_OID: &str = "1.2.840.113556.1.4.473";
pub const VLV_REQUEST_OID: &str = "2.16.840.1.113730.3.4.9";
pub const VLV_RESPONSE_OID: &str = "2.16.840.1.113730.3.4.10";

/// Server-side sort on a single attribute
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SortControl {
    pub attribute: String,
    pub reverse: bool,
}

/// Virtual list view window, addressed by 1-based offset
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VirtualListView {
    pub offset: usize,
    pub before_count: usize,
    pub after_count: usize,
    /// Last known content count, 0 when unknown
    pub content_count: usize,
}

/// Virtual list view response returned with the search result
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VirtualListViewResponse {
    pub content_count: usize,
    pub result: u64,
}

/// Build the sort and VLV pair for the next round of `filter`.
///
/// Sorts on `filter.order_by`, falling back to `default_sort_attribute`,
/// with the reverse flag set. The window starts right after the entries
/// already fetched and spans `total_per_page` entries.
pub fn build_controls(
    filter: &SearchFilter,
    default_sort_attribute: &str,
) -> (SortControl, VirtualListView) {
    let sort = SortControl {
        attribute: filter
            .order_by
            .clone()
            .unwrap_or_else(|| default_sort_attribute.to_string()),
        reverse: true,
    };

    let vlv = VirtualListView {
        offset: filter.total_results + 1,
        before_count: 0,
        after_count: filter.total_per_page.saturating_sub(1),
        content_count: filter.content_count.unwrap_or(0),
    };

    (sort, vlv)
}

impl SortControl {
    pub fn to_raw(&self) -> Result<RawControl> {
        let mut key = vec![Tag::OctetString(OctetString {
            inner: self.attribute.as_bytes().to_vec(),
            ..Default::default()
        })];
        if self.reverse {
            key.push(Tag::Boolean(Boolean {
                class: TagClass::Context,
                id: 1,
                inner: true,
            }));
        }

        let value = Tag::Sequence(Sequence {
            inner: vec![Tag::Sequence(Sequence {
                inner: key,
                ..Default::default()
            })],
            ..Default::default()
        });

        Ok(RawControl {
            ctype: SORT_REQUEST_OID.to_string(),
            crit: false,
            val: Some(encode(value)?),
        })
    }
}

impl VirtualListView {
    pub fn to_raw(&self) -> Result<RawControl> {
        let value = Tag::Sequence(Sequence {
            inner: vec![
                integer(self.before_count),
                integer(self.after_count),
                Tag::Sequence(Sequence {
                    class: TagClass::Context,
                    id: 0,
                    inner: vec![integer(self.offset), integer(self.content_count)],
                }),
            ],
            ..Default::default()
        });

        Ok(RawControl {
            ctype: VLV_REQUEST_OID.to_string(),
            crit: false,
            val: Some(encode(value)?),
        })
    }
}

impl VirtualListViewResponse {
    /// Parse the control value. Returns `None` for a malformed value.
    pub fn parse(val: &[u8]) -> Option<Self> {
        let (_, tag) = parse_tag(val).ok()?;
        let mut components = tag.expect_constructed()?.into_iter();

        // target position
        universal_uint(components.next()?, Types::Integer)?;
        let content_count = universal_uint(components.next()?, Types::Integer)?;
        let result = universal_uint(components.next()?, Types::Enumerated)?;

        Some(Self {
            content_count: content_count as usize,
            result,
        })
    }
}

fn integer(value: usize) -> Tag {
    Tag::Integer(Integer {
        inner: value as i64,
        ..Default::default()
    })
}

fn encode(tag: Tag) -> Result<Vec<u8>> {
    let mut buf = BytesMut::new();
    write::encode_into(&mut buf, tag.into_structure())
        .map_err(|e| Error::Search(format!("Failed to encode control: {}", e)))?;
    Ok(buf.to_vec())
}

fn universal_uint(tag: StructureTag, ty: Types) -> Option<u64> {
    let bytes = tag
        .match_class(TagClass::Universal)?
        .match_id(ty as u64)?
        .expect_primitive()?;
    parse_uint(bytes.as_slice()).ok().map(|(_, value)| value)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn decode(raw: &RawControl) -> Vec<StructureTag> {
        let val = raw.val.as_ref().unwrap();
        let (_, tag) = parse_tag(val).unwrap();
        tag.expect_constructed().unwrap()
    }

    fn uint(tag: StructureTag) -> u64 {
        let bytes = tag.expect_primitive().unwrap();
        parse_uint(bytes.as_slice()).unwrap().1
    }

    #[test]
    fn test_controls_follow_filter_state() {
        let mut filter = SearchFilter::page("DC=corp", "(objectClass=user)", 3, 10);
        filter.content_count = Some(57);

        let (sort, vlv) = build_controls(&filter, "sAMAccountName");

        assert_eq!(sort.attribute, "sAMAccountName");
        assert!(sort.reverse);
        assert_eq!(vlv.offset, 21);
        assert_eq!(vlv.before_count, 0);
        assert_eq!(vlv.after_count, 9);
        assert_eq!(vlv.content_count, 57);
    }

    #[test]
    fn test_order_by_overrides_default_sort() {
        let mut filter = SearchFilter::enumerate("DC=corp", "(objectClass=user)");
        filter.order_by = Some("displayName".to_string());

        let (sort, vlv) = build_controls(&filter, "sAMAccountName");

        assert_eq!(sort.attribute, "displayName");
        assert_eq!(vlv.offset, 1);
        assert_eq!(vlv.content_count, 0);
    }

    #[test]
    fn test_sort_control_encoding() {
        let sort = SortControl {
            attribute: "cn".to_string(),
            reverse: true,
        };
        let raw = sort.to_raw().unwrap();
        assert_eq!(raw.ctype, SORT_REQUEST_OID);
        assert!(!raw.crit);

        let mut keys = decode(&raw);
        assert_eq!(keys.len(), 1);
        let mut key = keys.remove(0).expect_constructed().unwrap().into_iter();

        let attribute = key.next().unwrap().expect_primitive().unwrap();
        assert_eq!(attribute, b"cn");

        let reverse = key
            .next()
            .unwrap()
            .match_class(TagClass::Context)
            .and_then(|t| t.match_id(1))
            .and_then(|t| t.expect_primitive())
            .unwrap();
        assert_ne!(reverse[0], 0);
    }

    #[test]
    fn test_vlv_control_encoding() {
        let vlv = VirtualListView {
            offset: 11,
            before_count: 0,
            after_count: 4,
            content_count: 120,
        };
        let raw = vlv.to_raw().unwrap();
        assert_eq!(raw.ctype, VLV_REQUEST_OID);

        let mut parts = decode(&raw).into_iter();
        assert_eq!(uint(parts.next().unwrap()), 0);
        assert_eq!(uint(parts.next().unwrap()), 4);

        let mut by_offset = parts
            .next()
            .unwrap()
            .match_class(TagClass::Context)
            .and_then(|t| t.match_id(0))
            .and_then(|t| t.expect_constructed())
            .unwrap()
            .into_iter();
        assert_eq!(uint(by_offset.next().unwrap()), 11);
        assert_eq!(uint(by_offset.next().unwrap()), 120);
    }

    #[test]
    fn test_parse_vlv_response() {
        // SEQUENCE { INTEGER 3, INTEGER 42, ENUMERATED success }
        let val = [
            0x30, 0x09, 0x02, 0x01, 0x03, 0x02, 0x01, 0x2a, 0x0a, 0x01, 0x00,
        ];

        let response = VirtualListViewResponse::parse(&val).unwrap();
        assert_eq!(response.content_count, 42);
        assert_eq!(response.result, 0);
    }

    #[test]
    fn test_parse_vlv_response_with_context_id() {
        // SEQUENCE { INTEGER 1, INTEGER 300, ENUMERATED success, OCTET STRING "ab" }
        let val = [
            0x30, 0x0e, 0x02, 0x01, 0x01, 0x02, 0x02, 0x01, 0x2c, 0x0a, 0x01, 0x00, 0x04, 0x02,
            0x61, 0x62,
        ];

        let response = VirtualListViewResponse::parse(&val).unwrap();
        assert_eq!(response.content_count, 300);
    }

    #[test]
    fn test_parse_malformed_vlv_response() {
        assert!(VirtualListViewResponse::parse(&[]).is_none());
        // INTEGER instead of SEQUENCE
        assert!(VirtualListViewResponse::parse(&[0x02, 0x01, 0x05]).is_none());
        // truncated SEQUENCE
        assert!(VirtualListViewResponse::parse(&[0x30, 0x03, 0x02, 0x01, 0x03]).is_none());
    }
}
